use std::fmt::Write;

use super::escape_html;
use crate::parser::{extract_money, extract_quantity, ItemRecord};

const PLACEHOLDER_NAME: &str = "Item";
const SEARCH_URL: &str = "/Product/SiteSearch?search=";
const LOCATIONS_URL: &str = "/Home/Locations";

/// Values derived from one record at render time.
#[derive(Debug)]
struct CardView<'a> {
    name: &'a str,
    includes: &'a str,
    image: &'a str,
    now: String,
    reg: String,
    qty: String,
    badge: &'a str,
}

impl<'a> CardView<'a> {
    fn new(item: &'a ItemRecord) -> Self {
        let name = if item.name.is_empty() {
            PLACEHOLDER_NAME
        } else {
            item.name.as_str()
        };
        CardView {
            name,
            includes: item.includes.as_str(),
            image: item.image_ref.as_str(),
            now: extract_money(&item.price_text),
            reg: extract_money(&item.reg_text),
            qty: extract_quantity(&item.qty_text),
            badge: item.badge_text.trim(),
        }
    }

    /// `data-*` attributes for the values that were found, in a fixed order.
    fn data_attrs(&self) -> String {
        let pairs = [
            ("data-reg", self.reg.as_str()),
            ("data-now", self.now.as_str()),
            ("data-qty", self.qty.as_str()),
            ("data-badge", self.badge),
        ];
        let mut out = String::new();
        for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
            let _ = write!(out, " {}=\"{}\"", key, escape_html(value));
        }
        out
    }

    fn includes_line(&self) -> String {
        if self.includes.is_empty() {
            String::new()
        } else {
            format!("Includes: {}", escape_html(self.includes))
        }
    }

    fn qty_line(&self) -> String {
        if self.qty.is_empty() {
            String::new()
        } else {
            format!("Qty Left: {}", escape_html(&self.qty))
        }
    }
}

/// Render one item as a self-contained clearance card.
///
/// Price slots (`ms-nowline`, `ms-regline`) and the `ms-offbadge` slot stay
/// empty; a later pass fills them from the `data-*` attributes on the root table.
pub fn render_card(item: &ItemRecord) -> String {
    let view = CardView::new(item);
    let name = escape_html(view.name);
    let search = escape_html(&urlencoding::encode(view.name));

    format!(
        r##"<table class="ms-card"{attrs} role="presentation" width="100%" cellspacing="0" cellpadding="0" style="border: 1px solid #e5e7eb; border-radius: 12px; overflow: hidden;">
  <tbody>
    <tr>
      <td style="padding: 0;">
        <div style="position: relative;">
          <a href="{search_url}{search}" style="text-decoration: none; color: inherit;">
            <img src="{image}" alt="{name}" style="width: 100%; height: auto; display: block; border: 0;" />
          </a>
          <div class="ms-badge" style="position: absolute; top: 10px; left: 10px; background: #111827; color: #fff; font-weight: 900; border-radius: 999px; padding: 6px 10px; font-size: 12px; letter-spacing: .04em;">Clearance</div>
          <div class="ms-offbadge" style="position: absolute; top: 10px; right: 10px; background: #b45309; color: #fff; font-weight: 900; border-radius: 999px; padding: 8px 14px; font-size: 14px; letter-spacing: .04em; box-shadow: 0 6px 14px rgba(0,0,0,.18);"></div>
          <div style="position: absolute; left: 0; bottom: 0; background: #ffffff; color: #111827; font-weight: 900; font-size: 14px; padding: 6px 10px; border-top-right-radius: 8px;">{name}</div>
        </div>
      </td>
    </tr>
    <tr>
      <td style="padding: 10px 12px 14px;">
        <table role="presentation" width="100%" cellspacing="0" cellpadding="0">
          <tbody>
            <tr>
              <td valign="top" style="padding-right: 10px;">
                <div style="color: #6b7280; font-size: 12px;">{includes}</div>
                <div style="margin-top: 8px; display: flex; align-items: center; gap: 10px; flex-wrap: wrap;">
                  <div class="ms-nowline" style="font-weight: 900; font-size: 13px; color: #111827;"></div>
                  <div style="color: #374151; font-size: 13px;">Was <span class="ms-regline" style="text-decoration: line-through;"></span></div>
                </div>
              </td>
              <td valign="top" style="text-align: right;">
                <div style="color: #6b7280; font-size: 12px;">{qty}</div>
                <a href="{locations}" style="display: inline-block; margin-top: 8px; padding: 8px 12px; border-radius: 8px; background: #f3f4f6; color: #111827; text-decoration: none; font-weight: 800; font-size: 12px;">Check Store Stock</a>
              </td>
            </tr>
          </tbody>
        </table>
      </td>
    </tr>
  </tbody>
</table>"##,
        attrs = view.data_attrs(),
        search_url = SEARCH_URL,
        search = search,
        image = escape_html(view.image),
        name = name,
        includes = view.includes_line(),
        qty = view.qty_line(),
        locations = LOCATIONS_URL,
    )
}

// ── Tests ──
