//! Operator precedence levels for Pratt parsing.

use kisumu_lexer::TokenKind;

/// Precedence levels (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 1,
    Equals = 2,      // == !=
    LessGreater = 3, // > < >= <=
    Sum = 4,         // + -
    Product = 5,     // * / %
    Prefix = 6,      // -X !X
    Call = 7,        // fn(x) arr[i]
}

impl Precedence {
    /// Get the infix precedence for a token kind.
    pub fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::LtEquals | TokenKind::Gt | TokenKind::GtEquals => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Precedence::Product,
            TokenKind::LParen | TokenKind::LBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_totally_ordered() {
        let order = [
            Precedence::Lowest,
            Precedence::Equals,
            Precedence::LessGreater,
            Precedence::Sum,
            Precedence::Product,
            Precedence::Prefix,
            Precedence::Call,
        ];
        for pair in order.windows(2) {
            assert!(pair[0] < pair[1], "{:?} < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_from_token() {
        assert_eq!(Precedence::from_token(TokenKind::NotEq), Precedence::Equals);
        assert_eq!(Precedence::from_token(TokenKind::GtEquals), Precedence::LessGreater);
        assert_eq!(Precedence::from_token(TokenKind::Minus), Precedence::Sum);
        assert_eq!(Precedence::from_token(TokenKind::Percent), Precedence::Product);
        assert_eq!(Precedence::from_token(TokenKind::LBracket), Precedence::Call);
        assert_eq!(Precedence::from_token(TokenKind::Semicolon), Precedence::Lowest);
        assert_eq!(Precedence::from_token(TokenKind::Bang), Precedence::Lowest);
    }
}
