// Marketplace lookup tables: vendor domain ids and currency display.

/// Vendor `domain` parameter for each marketplace hostname. Unknown
/// marketplaces fall back to the US store.
pub fn domain_id(marketplace: &str) -> u8 {
    match marketplace {
        "amazon.com" => 1,
        "amazon.co.uk" => 2,
        "amazon.de" => 3,
        "amazon.fr" => 4,
        "amazon.co.jp" => 5,
        "amazon.ca" => 6,
        "amazon.it" => 8,
        "amazon.es" => 9,
        "amazon.in" => 10,
        "amazon.com.br" => 11,
        "amazon.com.mx" => 12,
        "amazon.com.au" => 13,
        "amazon.nl" => 14,
        "amazon.tr" => 15,
        "amazon.ae" => 16,
        "amazon.pl" => 17,
        "amazon.se" => 18,
        "amazon.sg" => 19,
        "amazon.sa" => 20,
        "amazon.be" => 21,
        _ => 1,
    }
}

struct CurrencyStyle {
    symbol: &'static str,
    prefix: bool,
}

fn currency_style(marketplace: &str) -> CurrencyStyle {
    match marketplace {
        "amazon.co.uk" => CurrencyStyle {
            symbol: "£",
            prefix: true,
        },
        "amazon.de" | "amazon.fr" | "amazon.it" | "amazon.es" | "amazon.nl" | "amazon.be" => {
            CurrencyStyle {
                symbol: "€",
                prefix: false,
            }
        }
        "amazon.co.jp" => CurrencyStyle {
            symbol: "¥",
            prefix: true,
        },
        "amazon.in" => CurrencyStyle {
            symbol: "₹",
            prefix: true,
        },
        "amazon.com.br" => CurrencyStyle {
            symbol: "R$",
            prefix: true,
        },
        "amazon.tr" => CurrencyStyle {
            symbol: "₺",
            prefix: false,
        },
        "amazon.pl" => CurrencyStyle {
            symbol: "zł",
            prefix: false,
        },
        "amazon.se" => CurrencyStyle {
            symbol: "kr",
            prefix: false,
        },
        _ => CurrencyStyle {
            symbol: "$",
            prefix: true,
        },
    }
}

/// Formats a price for display text in the marketplace's currency style.
/// Display only; no conversion happens here.
pub fn format_price(price: f64, marketplace: &str) -> String {
    let style = currency_style(marketplace);
    if style.prefix {
        format!("{}{:.2}", style.symbol, price)
    } else {
        format!("{:.2} {}", price, style.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_marketplaces_resolve() {
        assert_eq!(domain_id("amazon.de"), 3);
        assert_eq!(domain_id("amazon.be"), 21);
    }

    #[test]
    fn unknown_marketplace_defaults_to_us() {
        assert_eq!(domain_id("amazon.example"), 1);
    }

    #[test]
    fn prices_format_per_marketplace() {
        assert_eq!(format_price(19.99, "amazon.com"), "$19.99");
        assert_eq!(format_price(19.99, "amazon.de"), "19.99 €");
        assert_eq!(format_price(5.0, "amazon.co.uk"), "£5.00");
    }
}
