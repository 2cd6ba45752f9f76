//! Context data construction and the built-in e-commerce vocabulary.

use rudder_core::Properties;
use serde_json::Value;
use tracing::debug;

use crate::config::{AdobeConfig, ProductIdentifier};
use crate::properties::{as_number, string};
use crate::vendor::ContextData;

/// Host e-commerce event → Adobe commerce event.
const ECOMMERCE_EVENTS: &[(&str, &str)] = &[
    ("Product Viewed", "prodView"),
    ("Product Added", "scAdd"),
    ("Product Removed", "scRemove"),
    ("Cart Viewed", "scView"),
    ("Checkout Started", "scCheckout"),
    ("Order Completed", "purchase"),
];

pub fn ecommerce_event(name: &str) -> Option<&'static str> {
    ECOMMERCE_EVENTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, adobe)| *adobe)
}

/// Rename host keys into Adobe context data keys: mapped keys take their
/// configured name, everything else gets the configured prefix. Values that
/// are not scalars are dropped.
pub fn map_context_data(config: &AdobeConfig, props: &Properties) -> ContextData {
    let mut data = ContextData::new();
    for (key, value) in props {
        if !is_scalar(value) {
            debug!(key = %key, "non-scalar property left out of context data");
            continue;
        }
        let adobe_key = match config.context_data_map.get(key) {
            Some(mapped) => mapped.clone(),
            None => format!("{}{}", config.context_data_prefix, key),
        };
        data.insert(adobe_key, value.clone());
    }
    data
}

/// Global context data overlaid with the event's own context data. Event
/// values win.
pub fn merge(global: &ContextData, event: ContextData) -> ContextData {
    let mut merged = global.clone();
    merged.extend(event);
    merged
}

/// Adobe `&&products` string: `;<id>;<quantity>;<price>` per product,
/// comma separated. Reads the `products` array, or the top-level properties
/// as a single product.
pub fn products_string(props: &Properties, identifier: ProductIdentifier) -> Option<String> {
    let entries: Vec<String> = match props.get("products") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<Properties>(item.clone()).ok())
            .filter_map(|product| product_entry(&product, identifier))
            .collect(),
        _ => product_entry(props, identifier).into_iter().collect(),
    };

    if entries.is_empty() {
        None
    } else {
        Some(entries.join(","))
    }
}

fn product_entry(product: &Properties, identifier: ProductIdentifier) -> Option<String> {
    let keys: &[&str] = match identifier {
        ProductIdentifier::Name => &["name"],
        ProductIdentifier::Id => &["product_id", "id"],
        ProductIdentifier::Sku => &["sku"],
    };
    let id = string(product, keys)?;
    let quantity = product.get("quantity").and_then(as_number).unwrap_or(1.0);
    let price = product.get("price").and_then(as_number).unwrap_or(0.0);
    Some(format!(
        ";{};{};{}",
        id,
        format_number(quantity),
        format_number(price * quantity)
    ))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(raw: Value) -> AdobeConfig {
        AdobeConfig::parse(&raw).unwrap()
    }

    fn props(value: Value) -> Properties {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_map_context_data_renames_and_prefixes() {
        let config = config(json!({
            "trackingServerUrl": "m.example.com",
            "contextDataPrefix": "app.",
            "contextDataMapping": [{ "from": "plan", "to": "myapp.plan" }]
        }));
        let data = map_context_data(
            &config,
            &props(json!({
                "plan": "pro",
                "seats": 4,
                "nested": { "a": 1 },
                "list": [1, 2],
                "nothing": null
            })),
        );

        assert_eq!(data.len(), 2);
        assert_eq!(data["myapp.plan"], "pro");
        assert_eq!(data["app.seats"], 4);
    }

    #[test]
    fn test_merge_prefers_event_values() {
        let mut global = ContextData::new();
        global.insert("color".into(), json!("red"));
        global.insert("tier".into(), json!("gold"));

        let mut event = ContextData::new();
        event.insert("color".into(), json!("blue"));

        let merged = merge(&global, event);
        assert_eq!(merged["color"], "blue");
        assert_eq!(merged["tier"], "gold");
    }

    #[test]
    fn test_products_string_from_array() {
        let p = props(json!({
            "products": [
                { "name": "Mug", "sku": "M-1", "quantity": 2, "price": 7.5 },
                { "name": "Tee", "sku": "T-9", "price": "20" },
                { "price": 1 }
            ]
        }));
        assert_eq!(
            products_string(&p, ProductIdentifier::Name).as_deref(),
            Some(";Mug;2;15,;Tee;1;20")
        );
        assert_eq!(
            products_string(&p, ProductIdentifier::Sku).as_deref(),
            Some(";M-1;2;15,;T-9;1;20")
        );
    }

    #[test]
    fn test_products_string_single_product() {
        let p = props(json!({ "product_id": "p-3", "price": 9.99 }));
        assert_eq!(
            products_string(&p, ProductIdentifier::Id).as_deref(),
            Some(";p-3;1;9.99")
        );
        assert_eq!(products_string(&p, ProductIdentifier::Name), None);
    }

    #[test]
    fn test_ecommerce_vocabulary() {
        assert_eq!(ecommerce_event("Order Completed"), Some("purchase"));
        assert_eq!(ecommerce_event("Cart Viewed"), Some("scView"));
        assert_eq!(ecommerce_event("order completed"), None);
    }
}
