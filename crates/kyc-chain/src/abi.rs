// crates/kyc-chain/src/abi.rs
//
// Contract call data for the status update:
//   selector(4) ++ address word ++ bool word ++ uint8 word ++ bytes32 word

use ethers::abi::{encode, Token};
use ethers::types::{H160, U256};

use kyc_core::{Address, KycError};

/// Default target function of the KYC registry contract.
pub const DEFAULT_FUNCTION_SIGNATURE: &str = "updateKYCStatus(address,bool,uint8,bytes32)";

/// First four bytes of keccak256 of the canonical signature.
pub fn function_selector(signature: &str) -> Result<[u8; 4], KycError> {
    let signature = signature.trim();
    let well_formed = signature
        .find('(')
        .map(|open| open > 0 && signature.ends_with(')'))
        .unwrap_or(false);
    if !well_formed || signature.contains(char::is_whitespace) {
        return Err(KycError::Config(format!(
            "invalid function signature: {:?}",
            signature
        )));
    }
    Ok(ethers::utils::id(signature))
}

/// Encode `(subject, verified, risk_score, proof)` for the given selector.
pub fn encode_update_call(
    selector: [u8; 4],
    subject: &Address,
    verified: bool,
    risk_score: u8,
    proof: &[u8; 32],
) -> Vec<u8> {
    let args = encode(&[
        Token::Address(H160::from(*subject)),
        Token::Bool(verified),
        Token::Uint(U256::from(risk_score)),
        Token::FixedBytes(proof.to_vec()),
    ]);
    let mut data = Vec::with_capacity(4 + args.len());
    data.extend_from_slice(&selector);
    data.extend_from_slice(&args);
    data
}
