//! Server-rendered prediction form.
//!
//! Every control carries its own domain (min/max, fixed option lists), mirroring the
//! bounds enforced again by [`crate::profile`] when the form is submitted.

use crate::predictor::PredictionResult;
use crate::profile::{Bounded, Choice, CustomerProfile};

pub const TITLE: &str = "🧳 Wellness Tourism Package Purchase Predictor";
pub const SUBMIT_LABEL: &str = "Predict Purchase Likelihood";

const STYLE: &str = r#"
    body { font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
    label { display: block; margin-top: 0.9rem; font-size: 0.9rem; }
    input, select { width: 100%; padding: 0.4rem; margin-top: 0.25rem; box-sizing: border-box; }
    button { margin-top: 1.5rem; padding: 0.6rem 1.2rem; cursor: pointer; }
    .alert { margin-top: 1rem; padding: 1rem; border-radius: 0.5rem; }
    .alert.success { background: #d4edda; color: #155724; }
    .alert.error { background: #f8d7da; color: #721c24; }
"#;

fn number_input<const MIN: i64, const MAX: i64>(
    name: &str,
    label: &str,
    value: Bounded<MIN, MAX>,
) -> String {
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{MIN}\" max=\"{MAX}\" step=\"1\" value=\"{value}\" required>\n"
    )
}

fn slider<const MIN: i64, const MAX: i64>(
    name: &str,
    label: &str,
    value: Bounded<MIN, MAX>,
) -> String {
    format!(
        "<label for=\"{name}\">{label}: <output id=\"{name}Value\">{value}</output></label>\n\
         <input type=\"range\" id=\"{name}\" name=\"{name}\" min=\"{MIN}\" max=\"{MAX}\" step=\"1\" value=\"{value}\" \
         oninput=\"document.getElementById('{name}Value').value = this.value\">\n"
    )
}

fn options_html(options: impl Iterator<Item = (String, bool)>) -> String {
    let mut html = String::new();
    for (option, selected) in options {
        let selected = if selected { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{option}\"{selected}>{option}</option>"
        ));
    }
    html
}

fn select_choice<C: Choice>(name: &str, label: &str, value: C) -> String {
    let options = options_html(
        C::ALL
            .iter()
            .map(|c| (c.label().to_string(), *c == value)),
    );
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <select id=\"{name}\" name=\"{name}\">{options}</select>\n"
    )
}

/// Dropdown over every value of a small bounded range (tiers, star ratings).
fn select_bounded<const MIN: i64, const MAX: i64>(
    name: &str,
    label: &str,
    value: Bounded<MIN, MAX>,
) -> String {
    let options = options_html((MIN..=MAX).map(|v| (v.to_string(), v == value.get())));
    format!(
        "<label for=\"{name}\">{label}</label>\n\
         <select id=\"{name}\" name=\"{name}\">{options}</select>\n"
    )
}

/// Renders the success/error banner for a prediction.
pub fn render_result(result: &PredictionResult) -> String {
    let confidence = result.confidence();
    if result.is_purchase() {
        format!(
            "<div class=\"alert success\">✔ The customer is <strong>LIKELY to purchase</strong> the package.\
             <br><br>Confidence: <strong>{confidence}</strong></div>"
        )
    } else {
        format!(
            "<div class=\"alert error\">✖ The customer is <strong>NOT likely to purchase</strong> the package.\
             <br><br>Confidence: <strong>{confidence}</strong></div>"
        )
    }
}

fn render_form(p: &CustomerProfile) -> String {
    let mut form = String::from("<form method=\"post\" action=\"/predict\">\n");

    form.push_str(&number_input("Age", "Age", p.age));
    form.push_str(&select_choice("TypeofContact", "Type of Contact", p.typeof_contact));
    form.push_str(&select_bounded("CityTier", "City Tier", p.city_tier));
    form.push_str(&select_choice("Occupation", "Occupation", p.occupation));
    form.push_str(&select_choice("Gender", "Gender", p.gender));
    form.push_str(&number_input(
        "NumberOfPersonVisiting",
        "Number of People Visiting",
        p.number_of_person_visiting,
    ));
    form.push_str(&select_bounded(
        "PreferredPropertyStar",
        "Preferred Property Star Rating",
        p.preferred_property_star,
    ));
    form.push_str(&select_choice("MaritalStatus", "Marital Status", p.marital_status));
    form.push_str(&number_input(
        "NumberOfTrips",
        "Number of Trips per Year",
        p.number_of_trips,
    ));
    form.push_str(&select_choice("Passport", "Passport Available", p.passport));
    form.push_str(&select_choice("OwnCar", "Owns a Car", p.own_car));
    form.push_str(&number_input(
        "NumberOfChildrenVisiting",
        "Number of Children Visiting (Below 5 Years)",
        p.number_of_children_visiting,
    ));
    form.push_str(&select_choice("Designation", "Designation Level", p.designation));
    form.push_str(&number_input(
        "MonthlyIncome",
        "Monthly Income (INR)",
        p.monthly_income,
    ));
    form.push_str(&slider(
        "PitchSatisfactionScore",
        "Pitch Satisfaction Score",
        p.pitch_satisfaction_score,
    ));
    form.push_str(&select_choice("ProductPitched", "Product Pitched", p.product_pitched));
    form.push_str(&number_input(
        "NumberOfFollowups",
        "Number of Follow-ups",
        p.number_of_followups,
    ));
    form.push_str(&number_input(
        "DurationOfPitch",
        "Duration of Pitch (Minutes)",
        p.duration_of_pitch,
    ));

    form.push_str(&format!("<button type=\"submit\">{SUBMIT_LABEL}</button>\n</form>\n"));
    form
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the whole page, pre-filled with `profile` and followed by the prediction
/// when one was made.
pub fn render_page(profile: &CustomerProfile, result: Option<&PredictionResult>) -> String {
    let result_html = result
        .map(|r| format!("<h2>Prediction Result</h2>\n{}\n", render_result(r)))
        .unwrap_or_default();
    page(profile, &result_html)
}

/// Page for a submission that could not be read as a customer profile. The form is
/// reset to its defaults and `message` is shown above it.
pub fn render_rejected_page(message: &str) -> String {
    let notice = format!(
        "<div class=\"alert error\">✖ The submitted details are invalid: {}</div>\n",
        escape_html(message)
    );
    page(&CustomerProfile::default(), &notice)
}

fn page(profile: &CustomerProfile, result_html: &str) -> String {
    let form = render_form(profile);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Wellness Tourism Package Purchase Predictor</title>
    <style>{STYLE}</style>
</head>
<body>
<h1>{TITLE}</h1>
<p>This application predicts whether a customer is likely to <strong>purchase a Wellness Tourism Package</strong> based on demographic and interaction attributes.</p>
<p>Please enter the customer details below to generate a prediction.</p>
{form}{result_html}</body>
</html>
"#
    )
}
