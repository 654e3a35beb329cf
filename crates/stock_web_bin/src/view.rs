//! Minimal inline HTML views.
//!
//! The service deliberately carries no template engine; the pages are small
//! enough to assemble with `format!`. Everything user-supplied or
//! provider-supplied is escaped before interpolation.

use chrono::NaiveDate;
use quote_model::{HistoricalSeries, Quote};

pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Stock Info</title></head>
<body>
<h1>Stock Info</h1>
<form action="/get_stock_info" method="post">
  <label for="symbol">Symbol:</label>
  <input type="text" id="symbol" name="symbol">
  <button type="submit">Get quote</button>
</form>
<form action="/get_historical_data" method="post">
  <label for="historical_symbol">Symbol:</label>
  <input type="text" id="historical_symbol" name="historical_symbol">
  <button type="submit">Get historical data</button>
</form>
</body>
</html>
"#;

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn quote_page(symbol: &str, quote: &Quote) -> String {
    let symbol = escape_html(symbol);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{symbol} quote</title></head>\n<body>\n\
         <h1>{symbol}</h1>\n<table>\n\
         <tr><th>Price</th><td>{price}</td></tr>\n\
         <tr><th>Open</th><td>{open}</td></tr>\n\
         <tr><th>High</th><td>{high}</td></tr>\n\
         <tr><th>Low</th><td>{low}</td></tr>\n\
         <tr><th>Volume</th><td>{volume}</td></tr>\n\
         </table>\n<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n",
        price = escape_html(&quote.price),
        open = escape_html(&quote.open),
        high = escape_html(&quote.high),
        low = escape_html(&quote.low),
        volume = escape_html(&quote.volume),
    )
}

pub fn historical_page(symbol: &str, series: &HistoricalSeries) -> String {
    // Most recent date first; dates the provider formats unexpectedly sink
    // to the bottom instead of breaking the page.
    let mut dates: Vec<&String> = series.keys().collect();
    dates.sort_by_key(|date| std::cmp::Reverse(NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()));

    let mut rows = String::new();
    for date in dates {
        let Some(bar) = series.get(date) else {
            continue;
        };
        rows.push_str(&format!(
            "<tr><td>{date}</td><td>{open}</td><td>{high}</td><td>{low}</td><td>{close}</td><td>{volume}</td></tr>\n",
            date = escape_html(date),
            open = escape_html(&bar.open),
            high = escape_html(&bar.high),
            low = escape_html(&bar.low),
            close = escape_html(&bar.close),
            volume = escape_html(&bar.volume),
        ));
    }

    let symbol = escape_html(symbol);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{symbol} daily history</title></head>\n<body>\n\
         <h1>{symbol} daily history</h1>\n<table>\n\
         <tr><th>Date</th><th>Open</th><th>High</th><th>Low</th><th>Close</th><th>Volume</th></tr>\n\
         {rows}</table>\n<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n"
    )
}
