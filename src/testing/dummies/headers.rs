use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use std::sync::Arc;

pub fn header_binary() -> Arc<InstanceHeader> {
    Arc::new(InstanceHeader::new(
        "bin".into(),
        vec![Attribute::nominal("class", &["A", "B"])],
        0,
    ))
}

/// Four features of both kinds followed by a binary class at index 4.
pub fn header_mixed() -> Arc<InstanceHeader> {
    Arc::new(InstanceHeader::new(
        "mixed".into(),
        vec![
            Attribute::nominal("color", &["red", "green", "blue"]),
            Attribute::numeric("size"),
            Attribute::nominal("shape", &["square", "circle"]),
            Attribute::numeric("mass"),
            Attribute::nominal("class", &["a", "b"]),
        ],
        4,
    ))
}
