//! Server-rendered HTML pages.
//!
//! Every value that comes from the store or from a submission goes through
//! [`escape`] before it is interpolated.

use axum::{http::StatusCode, response::Html};

use crate::forms::{CafeForm, FieldErrors, FIELDS};
use crate::models::Cafe;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

// Ссылки только http(s), иначе javascript: попадет в href
fn safe_href(url: &str) -> String {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        escape(url)
    } else {
        "#".to_string()
    }
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">\n\
         </head>\n<body>\n<div class=\"container py-4\">\n{body}</div>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

fn amenity(value: &str) -> &'static str {
    match value {
        "TRUE" => "✔",
        "FALSE" => "✘",
        _ => "?",
    }
}

/// List page: one table row per cafe, each with a delete button.
pub fn index(cafes: &[Cafe], csrf_token: &str) -> Html<String> {
    let mut body = String::from(
        "<h1>Cafes</h1>\n<p><a class=\"btn btn-primary\" href=\"/add\">Add a cafe</a> \
         <a class=\"btn btn-outline-secondary\" href=\"/all\">JSON</a></p>\n",
    );

    if cafes.is_empty() {
        body.push_str("<p class=\"text-muted\">No cafes yet.</p>\n");
        return layout("Cafes", &body);
    }

    body.push_str(
        "<table class=\"table table-striped align-middle\">\n<thead><tr>\
         <th></th><th>Name</th><th>City</th><th>Seats</th><th>Toilet</th><th>WiFi</th>\
         <th>Sockets</th><th>Calls</th><th>Price</th><th></th>\
         </tr></thead>\n<tbody>\n",
    );
    for cafe in cafes {
        body.push_str(&format!(
            "<tr>\
             <td><img src=\"{img}\" alt=\"{name}\" width=\"80\"></td>\
             <td><a href=\"{map}\" target=\"_blank\" rel=\"noopener\">{name}</a></td>\
             <td>{location}</td><td>{seats}</td>\
             <td>{toilet}</td><td>{wifi}</td><td>{sockets}</td><td>{calls}</td>\
             <td>{price}</td>\
             <td><form method=\"post\" action=\"/delete/{id}\">\
             <input type=\"hidden\" name=\"csrf_token\" value=\"{csrf}\">\
             <button class=\"btn btn-sm btn-danger\" type=\"submit\">Delete</button>\
             </form></td>\
             </tr>\n",
            img = safe_href(&cafe.img_url),
            map = safe_href(&cafe.map_url),
            name = escape(&cafe.name),
            location = escape(&cafe.location),
            seats = escape(&cafe.seats),
            toilet = amenity(&cafe.has_toilet),
            wifi = amenity(&cafe.has_wifi),
            sockets = amenity(&cafe.has_sockets),
            calls = amenity(&cafe.can_take_calls),
            price = escape(cafe.coffee_price.as_deref().unwrap_or("")),
            id = cafe.id,
            csrf = escape(csrf_token),
        ));
    }
    body.push_str("</tbody>\n</table>\n");

    layout("Cafes", &body)
}

/// Add form, re-populated with `form` values and annotated with `errors`.
pub fn add_form(
    form: &CafeForm,
    errors: &FieldErrors,
    csrf_token: &str,
    banner: Option<&str>,
) -> Html<String> {
    let mut body = String::from("<h1>Add a new cafe</h1>\n");
    if let Some(banner) = banner {
        body.push_str(&format!(
            "<div class=\"alert alert-danger\" role=\"alert\">{}</div>\n",
            escape(banner)
        ));
    }

    body.push_str("<form method=\"post\" action=\"/add\" novalidate>\n");
    body.push_str(&format!(
        "<input type=\"hidden\" name=\"csrf_token\" value=\"{}\">\n",
        escape(csrf_token)
    ));

    for field in FIELDS {
        let error = errors.get(field.name);
        let marker = if field.required { " <span class=\"text-danger\">*</span>" } else { "" };
        let invalid = if error.is_some() { " is-invalid" } else { "" };
        let required = if field.required { " required" } else { "" };

        body.push_str(&format!(
            "<div class=\"mb-3\">\
             <label class=\"form-label\" for=\"{name}\">{label}{marker}</label>\
             <input class=\"form-control{invalid}\" type=\"text\" id=\"{name}\" name=\"{name}\" \
             value=\"{value}\" placeholder=\"{placeholder}\"{required}>",
            name = field.name,
            label = escape(field.label),
            value = escape(form.value(field.name)),
            placeholder = escape(field.placeholder),
        ));
        if let Some(message) = error {
            body.push_str(&format!("<div class=\"invalid-feedback\">{}</div>", escape(message)));
        }
        body.push_str("</div>\n");
    }

    body.push_str(
        "<button class=\"btn btn-primary\" type=\"submit\" name=\"submit\" value=\"Submit\">Submit</button> \
         <a class=\"btn btn-link\" href=\"/\">Back to all cafes</a>\n</form>\n",
    );

    layout("Add a cafe", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{code} {title}</h1>\n<p>{message}</p>\n<p><a href=\"/\">Back to all cafes</a></p>\n",
        code = status.as_u16(),
        title = escape(title),
        message = escape(message),
    );
    layout(title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe(name: &str) -> Cafe {
        Cafe {
            id: 7,
            name: name.to_string(),
            map_url: "https://maps/x".to_string(),
            img_url: "javascript:alert(1)".to_string(),
            location: "Austin".to_string(),
            seats: "20+".to_string(),
            has_toilet: "TRUE".to_string(),
            has_wifi: "FALSE".to_string(),
            has_sockets: "TRUE".to_string(),
            can_take_calls: "FALSE".to_string(),
            coffee_price: None,
        }
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn index_escapes_names_and_blocks_script_urls() {
        let Html(page) = index(&[cafe("<b>Joe's</b>")], "tok");
        assert!(page.contains("&lt;b&gt;Joe&#x27;s&lt;/b&gt;"));
        assert!(!page.contains("<b>Joe"));
        assert!(!page.contains("javascript:"));
        assert!(page.contains("action=\"/delete/7\""));
        assert!(page.contains("value=\"tok\""));
    }

    #[test]
    fn index_without_cafes() {
        let Html(page) = index(&[], "tok");
        assert!(page.contains("No cafes yet."));
    }

    #[test]
    fn add_form_keeps_values_and_marks_errors() {
        let form = CafeForm { name: "Kaffe \"1\"".into(), ..Default::default() };
        let mut errors = FieldErrors::new();
        errors.insert("map_url".into(), "This field is required.".into());

        let Html(page) = add_form(&form, &errors, "tok", Some("Oops"));
        assert!(page.contains("value=\"Kaffe &quot;1&quot;\""));
        assert!(page.contains("is-invalid\" type=\"text\" id=\"map_url\""));
        assert!(page.contains("This field is required."));
        assert!(page.contains("alert-danger"));
        assert!(page.contains("placeholder=\"e.g., Starbucks\""));
    }

    #[test]
    fn error_page_shows_status() {
        let Html(page) = error_page(StatusCode::NOT_FOUND, "Cafe 3 not found");
        assert!(page.contains("404 Not Found"));
        assert!(page.contains("Cafe 3 not found"));
    }
}
