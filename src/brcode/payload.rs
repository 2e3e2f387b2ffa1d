use serde::Serialize;

use super::amount::Amount;
use super::crc::crc16_ccitt;
use super::error::BrCodeError;
use super::field::{decode_field, Field};
use super::tags::*;

/// Longest key that still fits the merchant account field next to the
/// GUI record: 99 - len("0014br.gov.bcb.pix") - 4 header bytes.
const MAX_PIX_KEY: usize = 77;

/// A static PIX payment payload ("copia e cola").
///
/// Carries the business fields of a BR Code. `encode` renders the EMV
/// TLV string, `decode` re-derives the fields from one and verifies the
/// checksum. The encoded string is a derived value: assembled per
/// render, handed to the QR/clipboard surface, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixPayload {
    pub pix_key: String,
    pub merchant_name: String,
    pub merchant_city: String,
    pub amount: Option<Amount>,
    pub reference: String,
}

impl PixPayload {
    /// Build a payload with the default city and the static `***`
    /// reference label.
    pub fn new(
        pix_key: impl Into<String>,
        amount: Option<Amount>,
        merchant_name: Option<&str>,
    ) -> Result<Self, BrCodeError> {
        Self::with_details(pix_key, amount, merchant_name, None, None)
    }

    /// Build a payload from caller data.
    ///
    /// Name, city and reference are truncated to their field widths and
    /// fall back to defaults when empty. Truncation is deliberate: a
    /// long merchant name yields a shorter code, never an error.
    pub fn with_details(
        pix_key: impl Into<String>,
        amount: Option<Amount>,
        merchant_name: Option<&str>,
        merchant_city: Option<&str>,
        reference: Option<&str>,
    ) -> Result<Self, BrCodeError> {
        let pix_key = pix_key.into();
        if pix_key.is_empty() {
            return Err(BrCodeError::InvalidPixKey("key is empty"));
        }
        if pix_key.len() > MAX_PIX_KEY {
            return Err(BrCodeError::InvalidPixKey(
                "key does not fit the merchant account field",
            ));
        }

        Ok(Self {
            pix_key,
            merchant_name: normalize(merchant_name, DEFAULT_MERCHANT_NAME, MAX_MERCHANT_NAME),
            merchant_city: normalize(merchant_city, DEFAULT_MERCHANT_CITY, MAX_MERCHANT_CITY),
            amount,
            reference: normalize(reference, STATIC_REFERENCE, MAX_REFERENCE),
        })
    }

    /// Render the payload string: fixed field order, nested merchant
    /// account and additional data templates, CRC last.
    pub fn encode(&self) -> Result<String, BrCodeError> {
        let account = format!(
            "{}{}",
            Field::new(SUB_GUI, PIX_GUI).render()?,
            Field::new(SUB_PIX_KEY, self.pix_key.as_str()).render()?
        );
        let additional = Field::new(SUB_REFERENCE, self.reference.as_str()).render()?;

        let mut out = String::with_capacity(160);
        out.push_str(&Field::new(TAG_PAYLOAD_FORMAT, PAYLOAD_FORMAT_VERSION).render()?);
        out.push_str(&Field::new(TAG_MERCHANT_ACCOUNT, account).render()?);
        out.push_str(&Field::new(TAG_MERCHANT_CATEGORY, MERCHANT_CATEGORY_NONE).render()?);
        out.push_str(&Field::new(TAG_CURRENCY, CURRENCY_BRL).render()?);
        if let Some(amount) = self.amount {
            out.push_str(&Field::new(TAG_AMOUNT, amount.to_string()).render()?);
        }
        out.push_str(&Field::new(TAG_COUNTRY, COUNTRY_BR).render()?);
        out.push_str(&Field::new(TAG_MERCHANT_NAME, self.merchant_name.as_str()).render()?);
        out.push_str(&Field::new(TAG_MERCHANT_CITY, self.merchant_city.as_str()).render()?);
        out.push_str(&Field::new(TAG_ADDITIONAL_DATA, additional).render()?);

        // The checksum covers everything up to and including its own
        // tag and length, but not its value.
        out.push_str(TAG_CRC);
        out.push_str("04");
        let crc = crc16_ccitt(out.as_bytes());
        out.push_str(&format!("{crc:04X}"));
        Ok(out)
    }

    /// Walk a payload string, verify its checksum and reconstruct the
    /// business fields.
    pub fn decode(payload: &str) -> Result<Self, BrCodeError> {
        let mut pix_key = None;
        let mut merchant_name = None;
        let mut merchant_city = None;
        let mut amount = None;
        let mut reference = None;

        let mut offset = 0;
        loop {
            let field = decode_field(payload, offset)?;
            if field.tag == TAG_CRC {
                if field.value.len() != 4 {
                    return Err(BrCodeError::MalformedField {
                        offset,
                        reason: "CRC value must be 4 hex digits",
                    });
                }
                if field.next != payload.len() {
                    return Err(BrCodeError::MalformedField {
                        offset: field.next,
                        reason: "data after the CRC record",
                    });
                }
                let declared = u16::from_str_radix(field.value, 16).map_err(|_| {
                    BrCodeError::MalformedField {
                        offset,
                        reason: "CRC value must be 4 hex digits",
                    }
                })?;
                let computed = crc16_ccitt(payload[..offset + 4].as_bytes());
                if declared != computed {
                    return Err(BrCodeError::ChecksumMismatch {
                        declared: field.value.to_uppercase(),
                        computed: format!("{computed:04X}"),
                    });
                }
                break;
            }

            match field.tag {
                TAG_MERCHANT_ACCOUNT => pix_key = Some(decode_account(field.value)?),
                TAG_AMOUNT => amount = Some(field.value.parse::<Amount>()?),
                TAG_MERCHANT_NAME => merchant_name = Some(field.value.to_string()),
                TAG_MERCHANT_CITY => merchant_city = Some(field.value.to_string()),
                TAG_ADDITIONAL_DATA => reference = decode_reference(field.value)?,
                // Fixed literals and optional EMV fields we never emit
                _ => {}
            }
            offset = field.next;
        }

        let pix_key = pix_key.ok_or(BrCodeError::MalformedField {
            offset: 0,
            reason: "missing merchant account field",
        })?;

        Ok(Self {
            pix_key,
            merchant_name: merchant_name.unwrap_or_default(),
            merchant_city: merchant_city.unwrap_or_default(),
            amount,
            reference: reference.unwrap_or_default(),
        })
    }
}

/// Pull the PIX key out of the nested merchant account template,
/// checking that the block actually belongs to the PIX arrangement.
fn decode_account(value: &str) -> Result<String, BrCodeError> {
    let mut gui = None;
    let mut key = None;
    let mut offset = 0;
    while offset < value.len() {
        let sub = decode_field(value, offset)?;
        match sub.tag {
            SUB_GUI => gui = Some(sub.value),
            SUB_PIX_KEY => key = Some(sub.value),
            _ => {}
        }
        offset = sub.next;
    }
    if gui.map(|g| !g.eq_ignore_ascii_case(PIX_GUI)).unwrap_or(true) {
        return Err(BrCodeError::MalformedField {
            offset: 0,
            reason: "merchant account is not a PIX entry",
        });
    }
    key.map(str::to_string).ok_or(BrCodeError::MalformedField {
        offset: 0,
        reason: "merchant account has no key",
    })
}

fn decode_reference(value: &str) -> Result<Option<String>, BrCodeError> {
    let mut reference = None;
    let mut offset = 0;
    while offset < value.len() {
        let sub = decode_field(value, offset)?;
        if sub.tag == SUB_REFERENCE {
            reference = Some(sub.value.to_string());
        }
        offset = sub.next;
    }
    Ok(reference)
}

/// Trim, fall back to `default` when empty, cut to `max` characters.
fn normalize(value: Option<&str>, default: &str, max: usize) -> String {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn test_known_payload() {
        let payload = PixPayload::new("11999998888", Some(amount("150.00")), Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        assert_eq!(
            payload,
            "00020126330014br.gov.bcb.pix011111999998888520400005303986\
             5406150.005802BR5910LOJA TESTE6009SAO PAULO62070503***63049573"
        );
    }

    #[test]
    fn test_known_payload_without_amount() {
        let payload = PixPayload::new("11999998888", None, Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        assert_eq!(
            payload,
            "00020126330014br.gov.bcb.pix011111999998888520400005303986\
             5802BR5910LOJA TESTE6009SAO PAULO62070503***6304B7FD"
        );
    }

    #[test]
    fn test_known_payload_with_details() {
        let payload = PixPayload::with_details(
            "+5511999998888",
            Some(amount("1234.56")),
            Some("MERCADO DO ZE"),
            Some("BELO HORIZONTE"),
            None,
        )
        .unwrap()
        .encode()
        .unwrap();
        assert_eq!(
            payload,
            "00020126360014br.gov.bcb.pix0114+5511999998888520400005303986\
             54071234.565802BR5913MERCADO DO ZE6014BELO HORIZONTE62070503***6304A0B7"
        );
    }

    #[test]
    fn test_roundtrip() {
        let original = PixPayload::with_details(
            "fulano@example.com",
            Some(amount("0.01")),
            Some("PADARIA DO JOAO"),
            Some("CURITIBA"),
            Some("PEDIDO123"),
        )
        .unwrap();
        let decoded = PixPayload::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_roundtrip_scenario() {
        let payload = PixPayload::new("11999998888", Some(amount("150.00")), Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        let decoded = PixPayload::decode(&payload).unwrap();
        assert_eq!(decoded.pix_key, "11999998888");
        assert_eq!(decoded.amount.unwrap().to_string(), "150.00");
        assert_eq!(decoded.merchant_name, "LOJA TESTE");
        assert_eq!(decoded.merchant_city, "SAO PAULO");
        assert_eq!(decoded.reference, "***");
    }

    #[test]
    fn test_omitted_amount_decodes_as_absent() {
        let payload = PixPayload::new("11999998888", None, Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        assert!(!payload.contains("5406"));
        let decoded = PixPayload::decode(&payload).unwrap();
        assert_eq!(decoded.amount, None);
    }

    #[test]
    fn test_long_name_truncated_to_25() {
        let long_name = "A".repeat(40);
        let payload = PixPayload::with_details(
            "fulano@example.com",
            Some(amount("0.01")),
            Some(&long_name),
            Some("RIO DE JANEIRO"),
            Some("PEDIDO123"),
        )
        .unwrap();
        assert_eq!(payload.merchant_name.len(), 25);
        assert_eq!(
            payload.encode().unwrap(),
            "00020126400014br.gov.bcb.pix0118fulano@example.com52040000530398\
             654040.015802BR5925AAAAAAAAAAAAAAAAAAAAAAAAA6014RIO DE JANEIRO\
             62130509PEDIDO1236304CB89"
        );
    }

    #[test]
    fn test_city_truncated_to_15() {
        let payload = PixPayload::with_details(
            "11999998888",
            None,
            None,
            Some("SAO JOSE DOS CAMPOS"),
            None,
        )
        .unwrap();
        assert_eq!(payload.merchant_city, "SAO JOSE DOS CA");
    }

    #[test]
    fn test_empty_name_falls_back() {
        let payload = PixPayload::new("11999998888", None, Some("   ")).unwrap();
        assert_eq!(payload.merchant_name, DEFAULT_MERCHANT_NAME);
        let payload = PixPayload::new("11999998888", None, None).unwrap();
        assert_eq!(payload.merchant_name, DEFAULT_MERCHANT_NAME);
    }

    #[test]
    fn test_length_invariant() {
        let payload = PixPayload::new("11999998888", Some(amount("150.00")), Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        let mut offset = 0;
        while offset < payload.len() {
            let field = decode_field(&payload, offset).unwrap();
            let declared: usize = payload[offset + 2..offset + 4].parse().unwrap();
            assert_eq!(declared, field.value.len());
            offset = field.next;
        }
        assert_eq!(offset, payload.len());
    }

    #[test]
    fn test_crc_over_prefix() {
        let payload = PixPayload::new("11999998888", Some(amount("150.00")), Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        let prefix = &payload[..payload.len() - 4];
        assert!(prefix.ends_with("6304"));
        let expected = format!("{:04X}", crc16_ccitt(prefix.as_bytes()));
        assert_eq!(payload[payload.len() - 4..], expected);
    }

    #[test]
    fn test_determinism() {
        let payload = PixPayload::new("11999998888", Some(amount("150.00")), Some("LOJA TESTE")).unwrap();
        assert_eq!(payload.encode().unwrap(), payload.encode().unwrap());
    }

    #[test]
    fn test_decode_rejects_corrupted_value() {
        let payload = PixPayload::new("11999998888", None, Some("LOJA TESTE"))
            .unwrap()
            .encode()
            .unwrap();
        // Same lengths, different bytes: only the checksum can notice
        let corrupted = payload.replace("LOJA TESTE", "LOJA TROCA");
        match PixPayload::decode(&corrupted) {
            Err(BrCodeError::ChecksumMismatch { .. }) => {}
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_corrupted_crc() {
        let payload = PixPayload::new("11999998888", None, None)
            .unwrap()
            .encode()
            .unwrap();
        let mut corrupted = payload.into_bytes();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == b'0' { b'1' } else { b'0' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert!(matches!(
            PixPayload::decode(&corrupted),
            Err(BrCodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_data() {
        let mut payload = PixPayload::new("11999998888", None, None)
            .unwrap()
            .encode()
            .unwrap();
        payload.push_str("00");
        assert!(matches!(
            PixPayload::decode(&payload),
            Err(BrCodeError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let payload = PixPayload::new("11999998888", None, None)
            .unwrap()
            .encode()
            .unwrap();
        assert!(matches!(
            PixPayload::decode(&payload[..payload.len() - 10]),
            Err(BrCodeError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_foreign_account() {
        // Same layout, different arrangement GUI
        let account = "0014br.gov.bcb.xyz011111999998888";
        let mut prefix = format!("00020126{:02}{}", account.len(), account);
        prefix.push_str("6304");
        let crc = crc16_ccitt(prefix.as_bytes());
        let payload = format!("{prefix}{crc:04X}");
        assert!(matches!(
            PixPayload::decode(&payload),
            Err(BrCodeError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_key() {
        assert!(matches!(
            PixPayload::new("", None, None),
            Err(BrCodeError::InvalidPixKey(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_key() {
        let key = "k".repeat(MAX_PIX_KEY + 1);
        assert!(matches!(
            PixPayload::new(key, None, None),
            Err(BrCodeError::InvalidPixKey(_))
        ));
        // The largest accepted key still renders
        let key = "k".repeat(MAX_PIX_KEY);
        let payload = PixPayload::new(key, None, None).unwrap();
        assert!(payload.encode().is_ok());
    }
}
