/// Field identifiers and fixed literals of the static BR Code layout.
/// Top-level tags appear in the payload in ascending order; the CRC is
/// always the final record.

// Top-level fields, in emission order
pub const TAG_PAYLOAD_FORMAT: &str = "00";
pub const TAG_MERCHANT_ACCOUNT: &str = "26";
pub const TAG_MERCHANT_CATEGORY: &str = "52";
pub const TAG_CURRENCY: &str = "53";
pub const TAG_AMOUNT: &str = "54";
pub const TAG_COUNTRY: &str = "58";
pub const TAG_MERCHANT_NAME: &str = "59";
pub const TAG_MERCHANT_CITY: &str = "60";
pub const TAG_ADDITIONAL_DATA: &str = "62";
pub const TAG_CRC: &str = "63";

// Merchant Account Information sub-fields (tag 26)
pub const SUB_GUI: &str = "00";
pub const SUB_PIX_KEY: &str = "01";

// Additional Data Field Template sub-fields (tag 62)
pub const SUB_REFERENCE: &str = "05";

// Fixed values
pub const PAYLOAD_FORMAT_VERSION: &str = "01";
pub const PIX_GUI: &str = "br.gov.bcb.pix";
pub const MERCHANT_CATEGORY_NONE: &str = "0000";
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_BR: &str = "BR";
/// Reference label used by static codes with no per-charge identifier.
pub const STATIC_REFERENCE: &str = "***";

// Defaults and field widths
pub const DEFAULT_MERCHANT_NAME: &str = "PIX";
pub const DEFAULT_MERCHANT_CITY: &str = "SAO PAULO";
pub const MAX_MERCHANT_NAME: usize = 25;
pub const MAX_MERCHANT_CITY: usize = 15;
pub const MAX_REFERENCE: usize = 25;
