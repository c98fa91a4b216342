//! HTML for the welcome banner and property cards.

use crate::platform::models::Property;

/// Location dropdown value that disables filtering.
pub const ALL_LOCATIONS: &str = "all";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
        Some(p) => format!("{p:.2}"),
        None => "-".to_string(),
    }
}

pub fn welcome_banner(username: Option<&str>) -> String {
    match username {
        Some(name) => format!("👋 Welcome, <b>{}</b>", escape(name)),
        None => String::new(),
    }
}

/// Exact, case-insensitive location match; [`ALL_LOCATIONS`] keeps everything.
pub fn filter_by_location<'a>(properties: &'a [Property], location: &str) -> Vec<&'a Property> {
    if location == ALL_LOCATIONS {
        return properties.iter().collect();
    }
    let wanted = location.to_lowercase();
    properties
        .iter()
        .filter(|p| p.location.to_lowercase() == wanted)
        .collect()
}

pub fn property_card(property: &Property) -> String {
    let title = escape(&property.title);
    let phone = escape(&property.phone);
    let image = property
        .image_url
        .as_deref()
        .map(|url| {
            format!(
                "<img src=\"{}\" alt=\"{}\" width=\"200\" height=\"150\">",
                escape(url),
                title
            )
        })
        .unwrap_or_default();
    let video = property
        .video_url
        .as_deref()
        .map(|url| format!("<video src=\"{}\" controls></video>", escape(url)))
        .unwrap_or_default();

    format!(
        "<div class=\"property-card\">\
<h3>{title}</h3>{image}{video}\
<p><strong>Location:</strong> {location}</p>\
<p><strong>Price:</strong> RWF {price}</p>\
<p><strong>Description:</strong> {description}</p>\
<p><strong>Owner:</strong> {owner}</p>\
<p><strong>Phone:</strong> {phone}</p>\
<a class=\"btn\" href=\"tel:{phone}\">Call Now</a>\
<button class=\"select-house\" data-property-id=\"{id}\">Select House</button>\
</div>",
        location = escape(&property.location),
        price = format_price(property.price),
        description = escape(property.description.as_deref().unwrap_or_default()),
        owner = escape(&property.owner),
        id = property.id,
    )
}

/// Full container contents; callers replace the container wholesale.
pub fn render_properties<'a>(properties: impl IntoIterator<Item = &'a Property>) -> String {
    properties.into_iter().map(property_card).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn property(id: i64, location: &str) -> Property {
        Property {
            id,
            title: format!("House {id}"),
            price: Some(150000.0),
            location: location.to_string(),
            owner: "Jean".to_string(),
            description: None,
            phone: "0781234567".to_string(),
            image_url: None,
            video_url: None,
            image_path: None,
            video_path: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_is_case_insensitive_and_exact() {
        let list = vec![
            property(1, "Kigali"),
            property(2, "kigali"),
            property(3, "Kigali Heights"),
            property(4, "Musanze"),
        ];
        let ids: Vec<i64> = filter_by_location(&list, "KIGALI").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(filter_by_location(&list, ALL_LOCATIONS).len(), 4);
        assert!(filter_by_location(&list, "Huye").is_empty());
    }

    #[test]
    fn test_card_escapes_text_and_formats_price() {
        let mut p = property(9, "Kigali");
        p.title = "<script>alert(1)</script>".to_string();
        p.image_url = Some("https://cdn.test/a.jpg".to_string());

        let html = property_card(&p);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("RWF 150000"));
        assert!(html.contains("src=\"https://cdn.test/a.jpg\""));
        assert!(html.contains("data-property-id=\"9\""));
    }

    #[test]
    fn test_render_is_one_card_per_property() {
        let list = vec![property(1, "Kigali"), property(2, "Huye")];
        let html = render_properties(&list);
        assert_eq!(html.matches("class=\"property-card\"").count(), 2);
        assert_eq!(render_properties(&[]), "");
    }

    #[test]
    fn test_welcome_banner() {
        assert_eq!(welcome_banner(Some("alice")), "👋 Welcome, <b>alice</b>");
        assert_eq!(welcome_banner(None), "");
    }
}
