/// The closed set of media types Tessera knows how to store and convert.
///
/// Each variant is a base type (type/subtype with parameters stripped).
/// A Content-Type value carrying parameters such as `charset` parses to
/// the same variant as its bare form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    TextPlain,
    TextMarkdown,
    TextHtml,
    TextCsv,
    Json,
    Yaml,
    Png,
    Jpeg,
    Webp,
    Gif,
    Avif,
}

impl MediaType {
    /// Parse a Content-Type value into a supported media type.
    ///
    /// Trailing parameters (e.g. `; charset=utf-8`) are accepted and
    /// ignored. Returns `None` for unparsable values and for any base
    /// type outside the supported set.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let parsed: mime::Mime = value.trim().parse().ok()?;
        Self::from_essence(parsed.essence_str())
    }

    /// Look up a media type by its bare `type/subtype` essence.
    #[must_use]
    pub fn from_essence(essence: &str) -> Option<Self> {
        match essence.to_ascii_lowercase().as_str() {
            "text/plain" => Some(Self::TextPlain),
            "text/markdown" => Some(Self::TextMarkdown),
            "text/html" => Some(Self::TextHtml),
            "text/csv" => Some(Self::TextCsv),
            "application/json" => Some(Self::Json),
            "application/yaml" => Some(Self::Yaml),
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            "image/avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Map a file extension (as used in `GET /fragments/:id.:ext` style
    /// format negotiation) to a media type.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(Self::TextPlain),
            "md" => Some(Self::TextMarkdown),
            "html" => Some(Self::TextHtml),
            "csv" => Some(Self::TextCsv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Return the canonical `type/subtype` string for this media type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextMarkdown => "text/markdown",
            Self::TextHtml => "text/html",
            Self::TextCsv => "text/csv",
            Self::Json => "application/json",
            Self::Yaml => "application/yaml",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Avif => "image/avif",
        }
    }

    /// Returns `true` for `text/*` media types.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::TextPlain | Self::TextMarkdown | Self::TextHtml | Self::TextCsv
        )
    }

    /// Returns `true` for `image/*` media types.
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(
            self,
            Self::Png | Self::Jpeg | Self::Webp | Self::Gif | Self::Avif
        )
    }

    /// Returns `true` if a Content-Type value names a supported type.
    #[must_use]
    pub fn is_supported(value: &str) -> bool {
        Self::parse(value).is_some()
    }

    /// The full set of image media types, in canonical order.
    #[must_use]
    pub fn image_set() -> [Self; 5] {
        [Self::Png, Self::Jpeg, Self::Webp, Self::Gif, Self::Avif]
    }

    /// The set of media types this type may legally be converted into.
    ///
    /// Always contains `self`. This is the single source of truth for
    /// conversion legality; the engine re-checks it defensively.
    #[must_use]
    pub fn conversion_targets(self) -> Vec<Self> {
        match self {
            Self::TextPlain => vec![Self::TextPlain, Self::TextMarkdown, Self::TextHtml],
            Self::TextMarkdown => vec![Self::TextMarkdown, Self::TextPlain, Self::TextHtml],
            Self::TextHtml => vec![Self::TextHtml, Self::TextPlain],
            Self::TextCsv => vec![Self::TextCsv, Self::TextPlain, Self::Json],
            Self::Json => vec![Self::Json, Self::TextPlain, Self::Yaml],
            Self::Yaml => vec![Self::Yaml, Self::TextPlain, Self::Json],
            Self::Png | Self::Jpeg | Self::Webp | Self::Gif | Self::Avif => {
                Self::image_set().to_vec()
            }
        }
    }

    /// Returns `true` if converting `self` into `target` is legal.
    #[must_use]
    pub fn can_convert_to(self, target: Self) -> bool {
        self.conversion_targets().contains(&target)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
