//! Evidence upload shapes.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// What an uploaded image depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSubject {
	/// Front of the ID document.
	DocumentFront,
	/// Back of the ID document.
	DocumentBack,
	/// Close-up of the document barcode.
	DocumentBarcode,
	/// Frontal selfie.
	SelfieFront,
	/// Selfie turned left.
	SelfieLeft,
	/// Selfie turned right.
	SelfieRight,
}

/// Encoding of an uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
	/// PNG image.
	#[serde(rename = "image/png")]
	Png,
	/// JPEG image.
	#[serde(rename = "image/jpeg")]
	Jpeg,
}

/// Barcode contents the caller already decoded on-device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExtractedBarcode {
	/// Symbology, e.g. `pdf417`.
	pub barcode_type: String,
	/// Raw decoded payload.
	pub extracted_data: String,
}

/// Extra evidence attached to an image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SupplementaryData {
	/// Pre-decoded barcode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extracted_barcode: Option<ExtractedBarcode>,
}

/// One uploaded image.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ImageData {
	/// Base64-encoded image bytes.
	pub data: String,
	/// What the image depicts.
	pub image_subject: ImageSubject,
	/// Image encoding.
	pub format: ImageFormat,
	/// Optional extra evidence.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub supplementary_data: Option<SupplementaryData>,
}
impl ImageData {
	/// Encodes raw image bytes for upload.
	pub fn from_bytes(bytes: impl AsRef<[u8]>, subject: ImageSubject, format: ImageFormat) -> Self {
		Self {
			data: STANDARD.encode(bytes),
			image_subject: subject,
			format,
			supplementary_data: None,
		}
	}

	/// Attaches a barcode the caller already decoded.
	pub fn with_extracted_barcode(
		mut self,
		barcode_type: impl Into<String>,
		extracted_data: impl Into<String>,
	) -> Self {
		self.supplementary_data = Some(SupplementaryData {
			extracted_barcode: Some(ExtractedBarcode {
				barcode_type: barcode_type.into(),
				extracted_data: extracted_data.into(),
			}),
		});

		self
	}
}
impl Debug for ImageData {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ImageData")
			.field("data_len", &self.data.len())
			.field("image_subject", &self.image_subject)
			.field("format", &self.format)
			.field("supplementary_data", &self.supplementary_data)
			.finish()
	}
}

/// Batch of images for one upload call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadImagesRequest {
	/// Images to upload; must not be empty.
	pub images: Vec<ImageData>,
}
impl UploadImagesRequest {
	/// Creates a request carrying `images`.
	pub fn new(images: impl IntoIterator<Item = ImageData>) -> Self {
		Self { images: images.into_iter().collect() }
	}
}

/// Next upload the API expects for the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
	/// Upload the document front.
	UploadDocumentFront,
	/// Upload the document back.
	UploadDocumentBack,
	/// Upload a basic selfie.
	UploadSelfieBasic,
	/// Upload liveness selfies.
	UploadSelfieLiveness,
	/// No more uploads are expected.
	Done,
	/// Step introduced after this client was released.
	#[serde(other)]
	Unknown,
}

/// Problem the API found with an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Issue {
	/// Upload could not be processed.
	BadUpload,
	/// Document text is unreadable.
	TextUnreadable,
	/// No face found on the ID document.
	NoFaceOnIdDetected,
	/// Barcode was only partially captured.
	IncompleteBarcodeDetected,
	/// Document type is not supported.
	UnsupportedIdType,
	/// Selfie is unusable.
	BadSelfie,
	/// Issue introduced after this client was released.
	#[serde(other)]
	Unknown,
}

/// Details for an [`Issue::UnsupportedIdType`] issue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsupportedIdTypeDetails {
	/// Whether a passport visa page was uploaded instead of the photo page.
	pub visa_page_of_passport: bool,
}

/// Structured details accompanying [`UploadImagesResponse::issues`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueDetails {
	/// Details for unsupported documents.
	pub unsupported_id_type: Option<UnsupportedIdTypeDetails>,
}

/// Result of an upload call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadImagesResponse {
	/// Problems found with the uploaded images.
	pub issues: Vec<Issue>,
	/// Structured details for some issues.
	pub issue_details: Option<IssueDetails>,
	/// Next upload the API expects.
	pub next_step: Option<NextStep>,
}
impl UploadImagesResponse {
	/// Returns `true` once the API expects no more uploads.
	pub fn is_done(&self) -> bool {
		matches!(self.next_step, Some(NextStep::Done))
	}
}
