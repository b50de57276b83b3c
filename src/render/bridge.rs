// self
use crate::{
	forgery::FORGERY_FIELD,
	render::{BridgeView, attr},
};

const FORM_ID: &str = "return_form";

/// Renders the auto-submitting document that posts the collected values to the provider.
///
/// The anti-forgery field is never forwarded, even if present in the payload.
pub fn render_bridge(view: &BridgeView<'_>) -> String {
	let mut inputs = String::new();

	for (name, value) in view.payload.iter().filter(|(name, _)| *name != FORGERY_FIELD) {
		inputs.push_str(&format!(
			"\t\t<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
			attr(name),
			attr(value)
		));
	}

	format!(
		r#"<!DOCTYPE html>
<html>
<head>
	<meta charset="utf-8">
</head>
<body>
	<form id="{FORM_ID}" method="post" action="{action}">
{inputs}		<noscript><button type="submit">Continue</button></noscript>
	</form>
	<script>document.getElementById('{FORM_ID}').submit();</script>
</body>
</html>
"#,
		action = attr(view.action.as_str()),
	)
}
