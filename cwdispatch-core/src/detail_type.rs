//! Binding a payload type to the events it is decoded from.

use serde::de::DeserializeOwned;

/// A payload type that knows which events carry it.
///
/// Implemented by hand or with `#[derive(DetailType)]`:
///
/// ```rust,ignore
/// #[derive(Deserialize, DetailType)]
/// #[detail_type(source = "aws.ec2", name = "EC2 Instance State-change Notification")]
/// #[serde(rename_all = "kebab-case")]
/// struct InstanceStateChange {
///     instance_id: String,
///     state: String,
/// }
///
/// registry.on::<InstanceStateChange, _>(handler)?;
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not declare its detail-type",
    label = "missing `DetailType` implementation",
    note = "Add `#[derive(DetailType)]` with `#[detail_type(\"...\")]`, or implement `DetailType`."
)]
pub trait DetailType: DeserializeOwned + Send + 'static {
    /// Source pattern; matches every source unless overridden.
    const SOURCE: &'static str = "*";

    /// Detail-type pattern, matched against the envelope's `detail-type`.
    const DETAIL_TYPE: &'static str;
}
