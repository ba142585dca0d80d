//! Request and response shapes exchanged with the Berbix API.
//!
//! Every body is snake_case JSON. Response types ignore unknown fields so new API attributes do
//! not break decoding.

pub mod image;
pub mod transaction;

pub use image::*;
pub use transaction::*;

// self
use crate::_prelude::*;

/// Bare-success result for calls whose only answer is a status code (`204 No Content`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finished;
impl Finished {
	/// Stable label mirroring the API's empty success.
	pub const fn as_str(self) -> &'static str {
		"finished"
	}
}
impl Display for Finished {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
