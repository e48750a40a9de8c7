//! Price extraction from the event page.
//!
//! The page lists ticket categories as table rows. The row we watch is
//!
//! ```html
//! <tr data-area="plyta" class="category ...">
//!   <td class="price"><b>244,95 zł</b></td>
//! </tr>
//! ```
//!
//! A missing row, cell or amount means the markup changed and is reported as
//! `Ok(None)`; only an unreadable amount inside the matched cell is an error.

use crate::error::ExtractError;
use crate::price::parse_price_pln;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

const AREA: &str = "plyta";
const ROW_CLASS: &str = "category";
const CURRENCY: &str = "zł";

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {}", css, e)))
}

/// Extract the watched category's price from a page body
pub fn extract_price(html: &str) -> Result<Option<Decimal>, ExtractError> {
    let rows = selector("tr")?;
    let price_cell = selector("td.price")?;
    let bold = selector("b")?;

    let doc = Html::parse_document(html);

    let Some(row) = doc.select(&rows).find(is_watched_row) else {
        return Ok(None);
    };
    let Some(cell) = row.select(&price_cell).next() else {
        return Ok(None);
    };
    let Some(amount) = cell.select(&bold).next() else {
        return Ok(None);
    };

    let text = element_text(amount);
    if text.is_empty() {
        return Ok(None);
    }

    let number = text.to_lowercase().replace(CURRENCY, "");
    let number = number.trim();
    parse_price_pln(number)
        .map(Some)
        .map_err(|source| ExtractError::InvalidPrice {
            text: text.clone(),
            source,
        })
}

fn is_watched_row(row: &ElementRef) -> bool {
    let el = row.value();
    let area_matches = el
        .attr("data-area")
        .map(|area| area.to_lowercase() == AREA)
        .unwrap_or(false);
    if !area_matches {
        return false;
    }

    el.classes()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .contains(ROW_CLASS)
}

/// Text nodes trimmed, joined by single spaces
fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
