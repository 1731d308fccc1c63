use std::sync::Arc;

use crate::format;

/// A value projected out of a record for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
    Series(&'a [f64]),
}

/// Records that can be ordered by one of their fields.
///
/// The sort manager never interprets a field, it only compares the values
/// returned here. Every key must be answerable for every record.
pub trait Sortable {
    type Key: Copy + Eq + std::fmt::Debug;

    fn sort_value(&self, key: Self::Key) -> SortValue<'_>;
}

impl<T: Sortable> Sortable for Arc<T> {
    type Key = T::Key;

    fn sort_value(&self, key: Self::Key) -> SortValue<'_> {
        self.as_ref().sort_value(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Symbol,
    Price,
    PriceChange24h,
    PriceChange7d,
    Volume24h,
    MktCap,
    Sparkline,
}

impl Field {
    /// Columns in display order.
    pub const ALL: [Field; 9] = [
        Field::Id,
        Field::Name,
        Field::Symbol,
        Field::Price,
        Field::PriceChange24h,
        Field::PriceChange7d,
        Field::Volume24h,
        Field::MktCap,
        Field::Sparkline,
    ];

    pub fn from_index(idx: usize) -> Option<Field> {
        Field::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        Field::ALL
            .iter()
            .position(|&f| f == self)
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Id => "#",
            Field::Name => "Coin",
            Field::Symbol => "Symbol",
            Field::Price => "Price",
            Field::PriceChange24h => "24h",
            Field::PriceChange7d => "7d",
            Field::Volume24h => "24h Volume",
            Field::MktCap => "Mkt Cap",
            Field::Sparkline => "Last 7 days",
        }
    }

    /// Name of the column in a token snapshot file.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Symbol => "symbol",
            Field::Price => "price",
            Field::PriceChange24h => "price_change_24h",
            Field::PriceChange7d => "price_change_7d",
            Field::Volume24h => "volume_24h",
            Field::MktCap => "mkt_cap",
            Field::Sparkline => "sparkline",
        }
    }

    /// The trend column is rendered but not offered as a sort target.
    pub fn is_sortable(self) -> bool {
        self != Field::Sparkline
    }
}

/// Display strings as they are shown in the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayStrings {
    pub price: String,
    pub price_change_24h: String,
    pub price_change_7d: String,
    pub volume_24h: String,
    pub mkt_cap: String,
}

/// One tradable asset's market snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingToken {
    pub id: u32,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub price_change_24h: f64,
    pub price_change_7d: f64,
    pub volume_24h: f64,
    pub mkt_cap: f64,
    pub sparkline: Vec<f64>,
    pub route: String,
    pub display: DisplayStrings,
}

impl TrendingToken {
    /// Builds a token and derives its display strings and default route.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        symbol: impl Into<String>,
        price: f64,
        price_change_24h: f64,
        price_change_7d: f64,
        volume_24h: f64,
        mkt_cap: f64,
        sparkline: Vec<f64>,
    ) -> Self {
        let symbol = symbol.into();
        let route = Self::default_route(&symbol);
        TrendingToken {
            id,
            name: name.into(),
            symbol,
            price,
            price_change_24h,
            price_change_7d,
            volume_24h,
            mkt_cap,
            sparkline,
            route,
            display: DisplayStrings {
                price: format::price(price),
                price_change_24h: format::percent(price_change_24h),
                price_change_7d: format::percent(price_change_7d),
                volume_24h: format::compact_usd(volume_24h),
                mkt_cap: format::compact_usd(mkt_cap),
            },
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn default_route(symbol: &str) -> String {
        format!("/coins/{}", symbol.to_lowercase())
    }

    /// Cell text for a column. The trend column has no text representation.
    pub fn display(&self, field: Field) -> String {
        match field {
            Field::Id => self.id.to_string(),
            Field::Name => self.name.clone(),
            Field::Symbol => self.symbol.to_uppercase(),
            Field::Price => self.display.price.clone(),
            Field::PriceChange24h => self.display.price_change_24h.clone(),
            Field::PriceChange7d => self.display.price_change_7d.clone(),
            Field::Volume24h => self.display.volume_24h.clone(),
            Field::MktCap => self.display.mkt_cap.clone(),
            Field::Sparkline => String::new(),
        }
    }

    /// Numeric value of a signed column, if the column is one.
    pub fn signed_value(&self, field: Field) -> Option<f64> {
        match field {
            Field::PriceChange24h => Some(self.price_change_24h),
            Field::PriceChange7d => Some(self.price_change_7d),
            _ => None,
        }
    }
}

impl Sortable for TrendingToken {
    type Key = Field;

    fn sort_value(&self, key: Field) -> SortValue<'_> {
        match key {
            Field::Id => SortValue::Number(self.id as f64),
            Field::Name => SortValue::Text(&self.name),
            Field::Symbol => SortValue::Text(&self.symbol),
            Field::Price => SortValue::Number(self.price),
            Field::PriceChange24h => SortValue::Number(self.price_change_24h),
            Field::PriceChange7d => SortValue::Number(self.price_change_7d),
            Field::Volume24h => SortValue::Number(self.volume_24h),
            Field::MktCap => SortValue::Number(self.mkt_cap),
            Field::Sparkline => SortValue::Series(&self.sparkline),
        }
    }
}
