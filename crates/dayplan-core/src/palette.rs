#![forbid(unsafe_code)]

//! Categorized palette catalog and token minting.
//!
//! Tokens are minted once, densely, in catalog order. A symbol listed under
//! two categories yields two independent tokens.

use crate::board::TokenId;

/// A named group of symbols shown together in the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub symbols: Vec<String>,
}

impl Category {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

/// An immutable palette symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,
    /// Index into [`Palette::categories`].
    pub category: usize,
}

const DEFAULT_CATALOG: &[(&str, &[&str])] = &[
    (
        "Running / Sports",
        &[
            "🏃🏻‍♂️", "⚽", "🏀", "🏐", "🏓", "🏸", "🥏", "🤸", "🤾", "🏊‍♀️", "🏋️‍♀️", "🚴", "⚾",
        ],
    ),
    (
        "Schedules / Planning",
        &["🗓️", "📅", "🕒", "⏰", "📆", "🔔", "📑", "✏️", "📔"],
    ),
    (
        "Meals / Food",
        &[
            "🍽️", "🍕", "🍟", "🍔", "🍏", "🍩", "🥞", "🌮", "🥗", "🍿", "🍦", "🍭",
        ],
    ),
    (
        "Parties / Events",
        &[
            "🎉", "🎂", "🎈", "🎁", "🎊", "🥳", "🎶", "🎵", "🔥", "🔮", "🍾", "🎬",
        ],
    ),
    (
        "Music & Art",
        &["🎨", "🎼", "🎧", "🎹", "🎷", "🎸", "🥁", "🖌️", "🎭", "🪗"],
    ),
    (
        "Other Kids Activities",
        &["🛝", "🏰", "🎡", "🎢", "🎠", "🛹", "🪁", "🪀", "🏓", "🃏"],
    ),
];

/// The catalog plus every token minted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    categories: Vec<Category>,
    tokens: Vec<Token>,
}

impl Palette {
    /// Mint one token per symbol per category.
    #[must_use]
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let tokens = categories
            .iter()
            .enumerate()
            .flat_map(|(category, cat)| {
                cat.symbols.iter().map(move |symbol| Token {
                    symbol: symbol.clone(),
                    category,
                })
            })
            .collect();
        Self { categories, tokens }
    }

    /// The built-in kids' activity catalog.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::from_categories(
            DEFAULT_CATALOG
                .iter()
                .map(|(name, symbols)| Category::new(*name, symbols.iter().copied()))
                .collect(),
        )
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Total number of minted tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.index())
    }

    /// Symbol for `id`, if minted.
    pub fn symbol(&self, id: TokenId) -> Option<&str> {
        self.token(id).map(|t| t.symbol.as_str())
    }

    /// First token carrying `symbol`, in catalog order.
    pub fn find(&self, symbol: &str) -> Option<TokenId> {
        self.tokens
            .iter()
            .position(|t| t.symbol == symbol)
            .map(|i| TokenId(i as u32))
    }

    /// The token carrying `symbol` within one category.
    pub fn find_in(&self, category: usize, symbol: &str) -> Option<TokenId> {
        self.tokens
            .iter()
            .position(|t| t.category == category && t.symbol == symbol)
            .map(|i| TokenId(i as u32))
    }

    /// Tokens minted for `category`, in display order.
    pub fn tokens_in(&self, category: usize) -> impl Iterator<Item = TokenId> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.category == category)
            .map(|(i, _)| TokenId(i as u32))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::default_catalog()
    }
}
