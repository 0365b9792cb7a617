use base64::{engine::general_purpose, Engine as _};

// The selected poster file, held in memory until the draft is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    // Inline preview without any network round trip
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_a_decodable_data_url() {
        let image = ImageAttachment::new("poster.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]);
        let url = image.preview_data_url();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(decoded, image.bytes());
    }
}
