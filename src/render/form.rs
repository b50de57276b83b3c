// self
use crate::{
	_prelude::*,
	error::ConfigError,
	fields::{Control, FieldRegistry, FieldSpec},
	forgery::FORGERY_FIELD,
	render::{FieldState, FormView, attr, text},
};

const FORM_ID: &str = "extra-fields-form";

/// Renders the profile form.
///
/// Emits one control per field of the view, in view order. Fails with
/// [`ConfigError::UnregisteredField`] if a field has no registered presentation.
pub fn render_form(registry: &FieldRegistry, view: &FormView<'_>) -> Result<String, ConfigError> {
	let mut groups = String::new();

	for (name, state) in &view.fields {
		let spec = registry.require(name)?;

		groups.push_str(&render_group(name, spec, state));
	}

	Ok(format!(
		r#"<!DOCTYPE html>
<html>
<head>
	<meta charset="utf-8">
	<title>User Profile</title>
	<link rel="stylesheet" href="https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css">
</head>
<body>
	<div class="jumbotron">
		<div class="container">
			<div class="row" style="padding-top: 20px;">
				<div class="col-md-6 col-sm-offset-2">
					<p class="lead">Hello <strong>{subject}</strong>, we just need a couple more things from you to complete your profile:</p>
				</div>
			</div>
			<form class="form-horizontal" method="post" action="{action}" id="{FORM_ID}">
				<input type="hidden" name="{FORGERY_FIELD}" value="{token}">
{groups}				<div class="form-group">
					<div class="col-sm-offset-2 col-sm-10">
						<button type="submit" class="btn btn-default">Submit</button>
					</div>
				</div>
			</form>
		</div>
	</div>
</body>
</html>
"#,
		subject = text(view.subject),
		action = attr(view.action),
		token = attr(view.forgery_token),
	))
}

fn render_group(name: &str, spec: &FieldSpec, state: &FieldState<'_>) -> String {
	let name = attr(name);
	let class = if state.invalid { "form-group has-error" } else { "form-group" };
	let control = match &spec.control {
		Control::Text { placeholder } => format!(
			r#"<input type="text" class="form-control" id="{name}" name="{name}" placeholder="{placeholder}" value="{value}">"#,
			placeholder = attr(placeholder),
			value = attr(state.value.unwrap_or_default()),
		),
		Control::Select { options } => {
			let mut rendered = String::new();

			for option in options {
				let selected =
					if state.value == Some(option.value.as_str()) { " selected" } else { "" };

				rendered.push_str(&format!(
					r#"<option value="{}"{selected}>{}</option>"#,
					attr(&option.value),
					text(&option.label),
				));
			}

			format!(r#"<select class="form-control" id="{name}" name="{name}" form="{FORM_ID}">{rendered}</select>"#)
		},
	};

	format!(
		r#"				<div class="{class}">
					<label for="{name}" class="col-sm-2 control-label">{label}</label>
					<div class="col-sm-4">
						{control}
					</div>
				</div>
"#,
		label = text(&spec.label),
	)
}
