//! Transaction creation, update, override, and state shapes.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, Tokens},
};

/// Fields shared by every transaction creation request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateTransactionRequest {
	/// Caller-side identifier for the end user.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_uid: Option<String>,
	/// Template that drives the verification flow.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub template_key: Option<String>,
	/// End-user phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	/// End-user email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Whether the end user consented to automated facial recognition.
	pub consents_to_automated_facial_recognition: bool,
}
impl CreateTransactionRequest {
	/// Creates a request for the given customer and template.
	pub fn new(customer_uid: impl Into<String>, template_key: impl Into<String>) -> Self {
		Self {
			customer_uid: Some(customer_uid.into()),
			template_key: Some(template_key.into()),
			..Self::default()
		}
	}

	/// Sets the end-user email address.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Sets the end-user phone number.
	pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
		self.phone = Some(phone.into());

		self
	}

	/// Records the end user's facial-recognition consent.
	pub fn with_facial_recognition_consent(mut self, consent: bool) -> Self {
		self.consents_to_automated_facial_recognition = consent;

		self
	}
}

/// Options for transactions completed through the hosted flow.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostedOptions {
	/// Address notified when the end user completes the flow.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub completion_email: Option<String>,
	/// Where the hosted flow sends the end user afterwards.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redirect_url: Option<String>,
}

/// Creation request for a hosted-flow transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateHostedTransactionRequest {
	/// Shared creation fields.
	#[serde(flatten)]
	pub transaction: CreateTransactionRequest,
	/// Hosted-flow options.
	pub hosted_options: HostedOptions,
}

/// Options for transactions driven entirely through API uploads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApiOnlyOptions {
	/// Expected issuing country of the ID document.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id_country: Option<String>,
	/// Expected ID document type.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id_type: Option<String>,
}

/// Creation request for an API-only transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CreateApiOnlyTransactionRequest {
	/// Shared creation fields.
	#[serde(flatten)]
	pub transaction: CreateTransactionRequest,
	/// API-only options.
	pub api_only_options: ApiOnlyOptions,
}

/// Result of creating a plain transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionResponse {
	/// Credential pair minted for the new transaction.
	pub tokens: Tokens,
}

/// Result of creating a hosted-flow transaction.
#[derive(Clone, Debug)]
pub struct CreateHostedTransactionResponse {
	/// Credential pair minted for the new transaction.
	pub tokens: Tokens,
	/// URL the end user should be sent to.
	pub hosted_url: Option<String>,
}

/// Result of creating an API-only transaction.
#[derive(Clone, Debug)]
pub struct CreateApiOnlyTransactionResponse {
	/// Credential pair minted for the new transaction; its client token authorizes uploads.
	pub tokens: Tokens,
}
impl CreateApiOnlyTransactionResponse {
	/// Returns the client token used for image uploads.
	pub fn client_token(&self) -> Option<&TokenSecret> {
		self.tokens.client_token.as_ref()
	}
}

/// Review decision or annotation applied to a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateTransactionRequest {
	/// Action label, e.g. `accept` or `reject`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub action: Option<String>,
	/// Free-form reviewer note.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
}
impl UpdateTransactionRequest {
	/// Creates an update carrying `action`.
	pub fn action(action: impl Into<String>) -> Self {
		Self { action: Some(action.into()), note: None }
	}

	/// Attaches a reviewer note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());

		self
	}
}

/// Canned verification result injected by an override (test transactions only).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponsePayload {
	/// US driver's license result.
	UsDl,
	/// US state ID result.
	UsId,
	/// US passport result.
	Passport,
}
impl ResponsePayload {
	/// Every payload, in wire-table order.
	pub const ALL: [ResponsePayload; 3] =
		[ResponsePayload::UsDl, ResponsePayload::UsId, ResponsePayload::Passport];

	/// Returns the wire value for the payload.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResponsePayload::UsDl => "us-dl",
			ResponsePayload::UsId => "us-id",
			ResponsePayload::Passport => "us-passport",
		}
	}
}
impl Display for ResponsePayload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResponsePayload {
	type Err = UnknownResponsePayload;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|payload| payload.as_str() == s)
			.ok_or_else(|| UnknownResponsePayload { value: s.to_owned() })
	}
}
impl Serialize for ResponsePayload {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for ResponsePayload {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;

		value.parse().map_err(serde::de::Error::custom)
	}
}

/// Raised when a string does not name a [`ResponsePayload`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown response payload `{value}`.")]
pub struct UnknownResponsePayload {
	/// Rejected value.
	pub value: String,
}

/// Forces fields, flags, or a canned result onto a test transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OverrideTransactionRequest {
	/// Canned verification result.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_payload: Option<ResponsePayload>,
	/// Flags to raise on the transaction.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub flags: Vec<String>,
	/// Extracted field values to force, keyed by field name.
	#[serde(skip_serializing_if = "HashMap::is_empty")]
	pub override_fields: HashMap<String, String>,
}

/// Verification state of a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
	/// Action resolved for the transaction (e.g. `accept`).
	pub action: Option<String>,
	/// Completion instant.
	#[serde(with = "time::serde::rfc3339::option")]
	pub completed_at: Option<OffsetDateTime>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
	/// Caller-side identifier for the end user.
	pub customer_uid: Option<String>,
	/// Dashboard link for reviewers.
	pub dashboard_url: Option<String>,
	/// Earlier transactions that matched this one.
	pub duplicates: Vec<Duplicate>,
	/// Entity the transaction belongs to.
	pub entity: Option<String>,
	/// Extracted identity fields.
	pub fields: Option<Fields>,
	/// Flags raised during verification.
	pub flags: Vec<String>,
	/// Transaction identifier.
	pub id: Option<u64>,
	/// Implementation details reported by the API.
	pub implementation_info: Option<String>,
}

/// Earlier transaction matched as a duplicate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Duplicate {
	/// Caller-side identifier of the duplicate.
	pub customer_uid: Option<String>,
	/// Identifier of the duplicate transaction.
	pub transaction_id: Option<u64>,
}

/// Identity fields extracted from the submitted evidence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
	/// City of residence.
	pub address_city: Option<FieldEntry>,
	/// Country of residence.
	pub address_country: Option<FieldEntry>,
	/// Postal code.
	pub address_postal_code: Option<FieldEntry>,
	/// Street address.
	pub address_street: Option<FieldEntry>,
	/// State or province.
	pub address_subdivision: Option<FieldEntry>,
	/// Unit or apartment.
	pub address_unit: Option<FieldEntry>,
	/// Age in years.
	pub age: Option<FieldEntry>,
	/// Date of birth.
	pub date_of_birth: Option<FieldEntry>,
	/// Email address.
	pub email_address: Option<FieldEntry>,
	/// Family name.
	pub family_name: Option<FieldEntry>,
	/// Given name.
	pub given_name: Option<FieldEntry>,
	/// ID document expiry date.
	pub id_expiry_date: Option<FieldEntry>,
	/// ID document issue date.
	pub id_issue_date: Option<FieldEntry>,
	/// ID document issuer.
	pub id_issuer: Option<FieldEntry>,
	/// ID document number.
	pub id_number: Option<FieldEntry>,
	/// ID document type.
	pub id_type: Option<FieldEntry>,
	/// Middle name.
	pub middle_name: Option<FieldEntry>,
	/// Nationality.
	pub nationality: Option<FieldEntry>,
	/// Phone number.
	pub phone_number: Option<FieldEntry>,
	/// Sex.
	pub sex: Option<FieldEntry>,
}

/// Single extracted value with its confidence and provenance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldEntry {
	/// Consolidated value.
	pub value: Option<String>,
	/// Confidence label (e.g. `high`).
	pub confidence: Option<String>,
	/// Per-source readings the value was consolidated from.
	pub sources: Vec<FieldSource>,
}

/// Reading of a field from one evidence source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSource {
	/// Value read from the source.
	pub value: Option<String>,
	/// Confidence label for this reading.
	pub confidence: Option<String>,
	/// Source type (e.g. `barcode`, `front`).
	#[serde(rename = "type")]
	pub kind: Option<String>,
}
