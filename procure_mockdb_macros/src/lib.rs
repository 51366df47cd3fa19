mod document;

use proc_macro::TokenStream;

/// Derive macro implementing `procure_mockdb::Document` for a struct.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "employees", validate = "Employee::check")]
/// pub struct Employee {
///     pub name: String,
///     pub email: String,
/// }
/// ```
///
/// Supported attributes:
/// - `collection = "..."`: collection name. Defaults to the snake_case type name plus `s`.
/// - `validate = "path"`: a `fn(&Self) -> Result<(), String>` run before every write.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
