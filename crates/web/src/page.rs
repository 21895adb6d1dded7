//! HTML rendering of the prediction form

use pricing_lib::{
    form::{FormSpec, FormValues},
    presenter::DisplayOutput,
};
use std::fmt::Write;
use v_htmlescape::escape;

const TITLE: &str = "🚗 Aplikasi Prediksi Harga Mobil";

/// Header copy; trusted markup
const INTRO_HTML: &str = "Aplikasi ini menggunakan algoritma <strong>AdaBoost</strong> untuk \
memprediksi harga pasaran mobil bekas berdasarkan spesifikasi dan fitur yang dimiliki.";

const ABOUT: &str =
    "Dibuat menggunakan Python & Streamlit dengan model Machine Learning AdaBoost Regressor.";

const FEATURES_CAPTION: &str = "Centang fitur yang tersedia pada mobil:";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:16rem;padding:1rem;background:#f0f2f6}\
main{flex:1;padding:1rem 2rem;max-width:48rem}\
.columns{display:flex;gap:2rem}.columns>section{flex:1}\
.success{background:#d4edda;padding:.75rem}\
.error{background:#f8d7da;padding:.75rem}\
.price{font-size:2rem;font-weight:bold}\
.caption{color:#6b6b6b;font-size:.875rem}";

fn html_escape(s: &str) -> String {
    escape(s).to_string()
}

/// Render the whole page, with the outcome of a submission when there is one
pub fn render(spec: &FormSpec, values: &FormValues, output: Option<&DisplayOutput>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", html_escape(TITLE));
    let _ = writeln!(html, "<style>{}</style>", STYLE);
    html.push_str("</head>\n<body>\n");

    html.push_str("<aside>\n<h2>Tentang Aplikasi</h2>\n");
    let _ = writeln!(html, "<p>{}</p>", html_escape(ABOUT));
    html.push_str("</aside>\n<main>\n");

    let _ = writeln!(html, "<h1>{}</h1>", html_escape(TITLE));
    let _ = writeln!(html, "<p>{}</p>\n<hr>", INTRO_HTML);

    html.push_str("<form method=\"post\" action=\"/\">\n<div class=\"columns\">\n");
    render_car_fields(&mut html, spec, values);
    render_features(&mut html, spec, values);
    html.push_str("</div>\n<button type=\"submit\">🔍 Prediksi Harga</button>\n</form>\n");

    if let Some(output) = output {
        render_output(&mut html, output);
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_car_fields(html: &mut String, spec: &FormSpec, values: &FormValues) {
    html.push_str("<section>\n<h3>Spesifikasi Mobil</h3>\n");

    let disabled = if spec.cars.placeholder { " disabled" } else { "" };
    let _ = writeln!(
        html,
        "<label>Pilih Model Mobil<select name=\"model\"{}>",
        disabled
    );
    for name in &spec.cars.options {
        let selected = if *name == values.car_name { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{0}\"{1}>{0}</option>",
            html_escape(name),
            selected
        );
    }
    html.push_str("</select></label>\n");

    let _ = writeln!(
        html,
        "<label>Tahun Pembuatan<input type=\"number\" name=\"year\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\"></label>",
        spec.year_min,
        spec.year_max,
        html_escape(&values.year)
    );

    html.push_str("<fieldset><legend>Transmisi</legend>\n");
    for transmission in spec.transmissions {
        let _ = writeln!(
            html,
            "<label><input type=\"radio\" name=\"transmission\" value=\"{0}\"{1}> {0}</label>",
            transmission,
            checked(transmission == values.transmission)
        );
    }
    html.push_str("</fieldset>\n</section>\n");
}

fn render_features(html: &mut String, spec: &FormSpec, values: &FormValues) {
    html.push_str("<section>\n<h3>Fitur Tambahan</h3>\n");
    let _ = writeln!(
        html,
        "<p class=\"caption\">{}</p>",
        html_escape(FEATURES_CAPTION)
    );
    for (flag, on) in spec.flags.iter().zip(values.flags) {
        let _ = writeln!(
            html,
            "<label><input type=\"checkbox\" name=\"{}\" value=\"on\"{}> {}</label><br>",
            flag.field,
            checked(on),
            html_escape(flag.label)
        );
    }
    html.push_str("</section>\n");
}

fn render_output(html: &mut String, output: &DisplayOutput) {
    match output {
        DisplayOutput::Success {
            label,
            formatted,
            disclaimer,
            ..
        } => {
            html.push_str("<div class=\"success\">Prediksi Selesai!</div>\n");
            let _ = writeln!(html, "<h4>{}</h4>", html_escape(label));
            let _ = writeln!(html, "<p class=\"price\">{}</p>", html_escape(formatted));
            let _ = writeln!(html, "<p><small>{}</small></p>", html_escape(disclaimer));
        }
        DisplayOutput::Error { message, .. } => {
            let _ = writeln!(html, "<div class=\"error\">{}</div>", html_escape(message));
        }
    }
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}
