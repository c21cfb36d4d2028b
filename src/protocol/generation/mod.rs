//! Distributed key generation onto share tokens.
//!
//! Both variants fail before touching any token when fewer tokens than
//! parties are present. Share `i` goes to the token in slot `i − 1`.

pub mod desmedt;
pub mod shoup;

pub use desmedt::DesmedtGeneration;
pub use shoup::ShoupGeneration;

use super::ProtocolError;
use crate::sharing::ThresholdParameters;
use crate::token::Cards;

pub(crate) fn require_tokens(cards: &Cards, tparams: &ThresholdParameters) -> Result<(), ProtocolError> {
    let required = tparams.parties() as usize;
    if cards.count() < required {
        return Err(ProtocolError::InsufficientTokens { available: cards.count(), required });
    }
    Ok(())
}
