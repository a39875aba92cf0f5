// Prompt template for LocalBusiness JSON-LD generation.
// Embedded text is passed through verbatim; nothing is escaped.

/// Fields the generated document must cover. Fixed at compile time.
pub const REQUIRED_FIELDS: [&str; 16] = [
    "Business Name",
    "Description",
    "URL",
    "Slogan",
    "Email",
    "Telephone",
    "Price Range",
    "Services Offered",
    "Image URL",
    "Address",
    "Latitude",
    "Longitude",
    "Area Served",
    "Map URL",
    "Opening Hours",
    "Social Media Links",
];

/// Schema prompt template.
/// Replace: {prior_document}, {menu_outline}, {required_fields}
pub const SCHEMA_PROMPT_TEMPLATE: &str = r#"Using the input provided below, Build a JSON-LD schema for a LocalBusiness.

### Previous Schema
```JSON
{prior_document}
```

### Navigational Menu(s) - To Identify Services
{menu_outline}

### Minimum Required Fields for JSON-LD
{required_fields}"#;

/// Inputs to one generation. Built fresh each time, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub prior_document: String,
    pub menu_outline: String,
}

pub fn build_prompt(context: &PromptContext) -> String {
    let required_fields = REQUIRED_FIELDS
        .iter()
        .map(|field| format!("- {field}"))
        .collect::<Vec<_>>()
        .join("\n");

    // Prior document goes in last and only once: its slot precedes the outline,
    // so placeholder-looking text inside either input is left alone.
    SCHEMA_PROMPT_TEMPLATE
        .replace("{required_fields}", &required_fields)
        .replace("{menu_outline}", &context.menu_outline)
        .replacen("{prior_document}", &context.prior_document, 1)
}
