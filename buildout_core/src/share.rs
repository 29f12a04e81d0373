//! # Share Tokens
//!
//! Encodes the calculator state (inputs, slider positions, base rates) into
//! a single URL-safe string so an estimate can be reopened from a link.
//! The token is the state's JSON, base64 encoded without padding.
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::share::ShareState;
//! use buildout_core::calculations::{ProjectInput, SliderValues};
//! use buildout_core::config::BaseValues;
//!
//! let state = ShareState {
//!     inputs: ProjectInput::new("Suite 400", 12_000.0, 2, "Boston, MA"),
//!     slider_values: SliderValues::new(),
//!     base_values: BaseValues::default(),
//! };
//! let token = state.encode().unwrap();
//! assert_eq!(ShareState::decode(&token).unwrap(), state);
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::calculations::{ProjectInput, SliderValues};
use crate::config::BaseValues;
use crate::errors::{CostError, CostResult};

/// Everything needed to reproduce an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareState {
    pub inputs: ProjectInput,
    pub slider_values: SliderValues,
    pub base_values: BaseValues,
}

impl ShareState {
    /// Encode to a URL-safe token.
    pub fn encode(&self) -> CostResult<String> {
        let json = serde_json::to_vec(self).map_err(CostError::serialization)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token produced by [`ShareState::encode`].
    ///
    /// Surrounding whitespace is ignored.
    pub fn decode(token: &str) -> CostResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| CostError::InvalidShareToken { reason: e.to_string() })?;
        serde_json::from_slice(&bytes).map_err(|e| CostError::InvalidShareToken { reason: e.to_string() })
    }
}
