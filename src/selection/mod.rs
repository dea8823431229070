//! Text selection over the pages of a document.
//!
//! A selection is driven by pointer gestures: [`TextSelection::start`] sets
//! the anchor (where the gesture began) and [`TextSelection::extend`] moves
//! the focus (where it currently is). Anchor and focus may be in either
//! order; [`TextSelection::start_endpoint`] and
//! [`TextSelection::end_endpoint`] give them in reading order.
//!
//! The words selected on each page are computed on demand from that page's
//! [`TextLayer`] and cached until the selection changes. Renderers and
//! clipboard exporters consume them through a pair of callbacks, one for
//! whole words and one for partially selected words.
//!
//! A selection is owned by a single task. It is not `Sync`-shared; the async
//! queries take `&mut self` and only commit to the cache once they finish, so
//! a cancelled query leaves the selection as it was.

mod cancel;
mod offset;

pub use cancel::CancelFlag;
pub use offset::calculate_char_index_and_offset;

use crate::config::LayoutConfig;
use crate::document::TextLayerLoader;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::layout::{TextLine, Word};
use crate::text_layer::TextLayer;
use std::ops::RangeInclusive;

/// One end of a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEndpoint {
    /// 1-based page number
    pub page_number: usize,
    /// Word under the endpoint
    pub word: Word,
    /// Letter index inside `word`; `None` selects the whole word
    pub offset: Option<usize>,
    /// Position inside the letter at `offset`, in `[0, 1]`
    pub offset_distance: Option<f64>,
}

impl SelectionEndpoint {
    fn new(page_number: usize, word: &Word, point: Option<&Point>) -> Self {
        let hit = point.and_then(|p| calculate_char_index_and_offset(word, p, true));
        Self {
            page_number,
            word: word.clone(),
            offset: hit.map(|(index, _)| index),
            offset_distance: hit.map(|(_, distance)| distance),
        }
    }

    /// Index of the endpoint word in its page.
    pub fn word_index(&self) -> usize {
        self.word.index_in_page()
    }
}

/// Selection state of one document.
///
/// # Examples
///
/// ```
/// use pdf_text_layer::geometry::OrientedRect;
/// use pdf_text_layer::layout::{Letter, Word};
/// use pdf_text_layer::{TextLayerPipeline, TextSelection};
///
/// let letters: Vec<Letter> = "Hello World"
///     .chars()
///     .enumerate()
///     .map(|(i, c)| {
///         let x = i as f64 * 6.0;
///         Letter::new(c.to_string(), OrientedRect::from_edges(x, 0.0, x + 6.0, 10.0), 10.0, i)
///     })
///     .collect();
/// let layer = TextLayerPipeline::new().process_page(1, letters, Vec::new()).unwrap();
///
/// let mut selection = TextSelection::new(1);
/// selection.start(1, layer.word_at(1).unwrap(), None).unwrap();
/// selection.extend(1, layer.word_at(0).unwrap(), None).unwrap();
/// assert!(selection.is_backward());
///
/// let words = selection
///     .get_selection_for_page_as(&layer, |w| w.text(), |w, s, e| w.text_between(s, e).unwrap())
///     .unwrap();
/// assert_eq!(words, vec!["Hello", "World"]);
/// ```
#[derive(Debug, Clone)]
pub struct TextSelection {
    number_of_pages: usize,
    check_interval: usize,
    anchor: Option<SelectionEndpoint>,
    focus: Option<SelectionEndpoint>,
    is_backward: bool,
    selected_words: Vec<Option<Vec<Word>>>,
}

impl TextSelection {
    /// Create an empty selection for a document of `number_of_pages` pages.
    pub fn new(number_of_pages: usize) -> Self {
        Self::with_config(number_of_pages, &LayoutConfig::default())
    }

    /// Create an empty selection using the cancellation interval of `config`.
    pub fn with_config(number_of_pages: usize, config: &LayoutConfig) -> Self {
        Self {
            number_of_pages,
            check_interval: config.cancellation_check_interval.max(1),
            anchor: None,
            focus: None,
            is_backward: false,
            selected_words: vec![None; number_of_pages],
        }
    }

    /// Number of pages of the document.
    pub fn number_of_pages(&self) -> usize {
        self.number_of_pages
    }

    fn check_page(&self, page_number: usize) -> Result<()> {
        if page_number == 0 || page_number > self.number_of_pages {
            return Err(Error::page_out_of_range(page_number, self.number_of_pages));
        }
        Ok(())
    }

    /// Begin a selection at `word`.
    ///
    /// With a `point`, the anchor is the letter under (or nearest to) it;
    /// otherwise the anchor covers the whole word. Any previous focus is
    /// dropped.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn start(&mut self, page_number: usize, word: &Word, point: Option<&Point>) -> Result<()> {
        self.check_page(page_number)?;
        self.anchor = Some(SelectionEndpoint::new(page_number, word, point));
        self.focus = None;
        self.is_backward = false;
        self.clear_selected_words();
        Ok(())
    }

    /// Move the focus of the selection to `word`.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` for a page number outside the document
    /// - `InvalidState` when no selection was started
    pub fn extend(&mut self, page_number: usize, word: &Word, point: Option<&Point>) -> Result<()> {
        self.check_page(page_number)?;
        let anchor = self
            .anchor
            .as_ref()
            .ok_or_else(|| Error::InvalidState("extend called before start".to_string()))?;
        let focus = SelectionEndpoint::new(page_number, word, point);
        self.is_backward = Self::compute_is_backward(anchor, &focus);
        self.focus = Some(focus);
        self.clear_selected_words();
        Ok(())
    }

    fn compute_is_backward(anchor: &SelectionEndpoint, focus: &SelectionEndpoint) -> bool {
        if anchor.page_number != focus.page_number {
            anchor.page_number > focus.page_number
        } else if anchor.word_index() == focus.word_index() {
            anchor.offset > focus.offset
        } else {
            anchor.word_index() > focus.word_index()
        }
    }

    /// Select a single word, as on double click.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn select_word(&mut self, page_number: usize, word: &Word) -> Result<()> {
        self.start(page_number, word, None)?;
        self.extend(page_number, word, None)
    }

    /// Select a whole line, as on triple click.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn select_line(&mut self, page_number: usize, line: &TextLine) -> Result<()> {
        let (first, last) = match (line.words().first(), line.words().last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::InvalidArgument("line has no words".to_string())),
        };
        self.start(page_number, first, None)?;
        self.extend(page_number, last, None)
    }

    /// Drop anchor, focus and every cached page.
    pub fn reset_selection(&mut self) {
        self.anchor = None;
        self.focus = None;
        self.is_backward = false;
        self.clear_selected_words();
    }

    /// Drop the cached words of every page.
    pub fn clear_selected_words(&mut self) {
        self.selected_words.iter_mut().for_each(|page| *page = None);
    }

    /// Whether both anchor and focus are set.
    pub fn is_valid(&self) -> bool {
        self.anchor.is_some() && self.focus.is_some()
    }

    /// Whether the focus precedes the anchor in reading order.
    pub fn is_backward(&self) -> bool {
        self.is_backward
    }

    /// Where the gesture began.
    pub fn anchor(&self) -> Option<&SelectionEndpoint> {
        self.anchor.as_ref()
    }

    /// Where the gesture currently is.
    pub fn focus(&self) -> Option<&SelectionEndpoint> {
        self.focus.as_ref()
    }

    /// First endpoint in reading order.
    pub fn start_endpoint(&self) -> Option<&SelectionEndpoint> {
        if self.is_backward {
            self.focus.as_ref()
        } else {
            self.anchor.as_ref().filter(|_| self.focus.is_some())
        }
    }

    /// Last endpoint in reading order.
    pub fn end_endpoint(&self) -> Option<&SelectionEndpoint> {
        if self.is_backward {
            self.anchor.as_ref()
        } else {
            self.focus.as_ref()
        }
    }

    fn endpoints(&self) -> Option<(&SelectionEndpoint, &SelectionEndpoint)> {
        Some((self.start_endpoint()?, self.end_endpoint()?))
    }

    /// Pages touched by the selection, in ascending order.
    pub fn get_selected_pages_indexes(&self) -> Option<RangeInclusive<usize>> {
        let (start, end) = self.endpoints()?;
        Some(start.page_number..=end.page_number)
    }

    /// Cached words of a page, if they were computed since the last change.
    pub fn selected_words_for_page(&self, page_number: usize) -> Option<&[Word]> {
        self.selected_words
            .get(page_number.checked_sub(1)?)?
            .as_deref()
    }

    /// Replace the cached words of a page.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn set_selected_words_for_page(
        &mut self,
        page_number: usize,
        words: Vec<Word>,
    ) -> Result<()> {
        self.check_page(page_number)?;
        self.selected_words[page_number - 1] = Some(words);
        Ok(())
    }

    /// Whether `word` of `page_number` lies between the selection endpoints.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn is_word_selected(&self, page_number: usize, word: &Word) -> Result<bool> {
        self.check_page(page_number)?;
        let Some((start, end)) = self.endpoints() else {
            return Ok(false);
        };
        let position = (page_number, word.index_in_page());
        Ok((start.page_number, start.word_index()) <= position
            && position <= (end.page_number, end.word_index()))
    }

    /// Index range of the selected words of a page, or `None` when the page
    /// has nothing selected.
    fn page_word_bounds(&self, page_number: usize, layer: &TextLayer) -> Option<(usize, usize)> {
        let (start, end) = self.endpoints()?;
        if layer.is_empty() || page_number < start.page_number || page_number > end.page_number {
            return None;
        }
        let first = if page_number == start.page_number {
            start.word_index()
        } else {
            0
        };
        let last = if page_number == end.page_number {
            end.word_index()
        } else {
            layer.count() - 1
        };
        Some((first, last))
    }

    fn select_words_in_range(
        &self,
        page_number: usize,
        layer: &TextLayer,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<Word>> {
        let Some((first, last)) = self.page_word_bounds(page_number, layer) else {
            return Ok(Vec::new());
        };
        let range = layer.words_between(first, last)?;
        let mut words = Vec::with_capacity(range.len());
        for (i, word) in range.enumerate() {
            self.checkpoint(cancel, i)?;
            words.push(word.clone());
        }
        Ok(words)
    }

    /// Check `cancel` once every `check_interval` enumerated words.
    fn checkpoint(&self, cancel: Option<&CancelFlag>, enumerated: usize) -> Result<()> {
        match cancel {
            Some(cancel) if (enumerated + 1) % self.check_interval == 0 => cancel.check(),
            _ => Ok(()),
        }
    }

    /// Map the selected words of a page through `full` or `partial`.
    fn classify<T, F, P>(
        &self,
        page_number: usize,
        words: &[Word],
        mut full: F,
        mut partial: P,
        cancel: Option<&CancelFlag>,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Word) -> T,
        P: FnMut(&Word, usize, usize) -> T,
    {
        let Some((start, end)) = self.endpoints() else {
            return Ok(Vec::new());
        };
        let mut mapped = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            self.checkpoint(cancel, i)?;
            let n = word.letter_count();
            if n == 0 {
                mapped.push(full(word));
                continue;
            }
            let is_start =
                page_number == start.page_number && word.index_in_page() == start.word_index();
            let is_end = page_number == end.page_number && word.index_in_page() == end.word_index();
            let lo = (if is_start { start.offset.unwrap_or(0) } else { 0 }).min(n - 1);
            let hi = (if is_end { end.offset.unwrap_or(n - 1) } else { n - 1 }).min(n - 1);
            let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
            if lo == 0 && hi == n - 1 {
                mapped.push(full(word));
            } else {
                mapped.push(partial(word, lo, hi));
            }
        }
        Ok(mapped)
    }

    /// Selected words of a realised page, in document order.
    ///
    /// Whole words go through `full`; the first or last word of a selection
    /// that starts or ends inside it goes through `partial` with its
    /// inclusive letter range.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` when the layer's page is outside the document, or an
    ///   endpoint word does not belong to it
    pub fn get_selection_for_page_as<T, F, P>(
        &mut self,
        layer: &TextLayer,
        full: F,
        partial: P,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Word) -> T,
        P: FnMut(&Word, usize, usize) -> T,
    {
        let page_number = layer.page_number();
        self.check_page(page_number)?;
        if let Some(words) = self.selected_words_for_page(page_number) {
            return self.classify(page_number, words, full, partial, None);
        }
        let words = self.select_words_in_range(page_number, layer, None)?;
        let mapped = self.classify(page_number, &words, full, partial, None)?;
        self.selected_words[page_number - 1] = Some(words);
        Ok(mapped)
    }

    /// Like [`get_selection_for_page_as`](Self::get_selection_for_page_as),
    /// loading the page's layer through `loader` when needed.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` for a page number outside the document
    /// - `Cancelled` when `cancel` fires; the selection is left untouched
    /// - any error of the loader
    pub async fn get_page_selection_as_async<L, T, F, P>(
        &mut self,
        loader: &L,
        page_number: usize,
        full: F,
        partial: P,
        cancel: &CancelFlag,
    ) -> Result<Vec<T>>
    where
        L: TextLayerLoader + ?Sized,
        F: FnMut(&Word) -> T,
        P: FnMut(&Word, usize, usize) -> T,
    {
        self.check_page(page_number)?;
        let in_selection = self
            .get_selected_pages_indexes()
            .is_some_and(|pages| pages.contains(&page_number));
        if !in_selection {
            return Ok(Vec::new());
        }
        if let Some(words) = self.selected_words_for_page(page_number) {
            return self.classify(page_number, words, full, partial, Some(cancel));
        }

        let words = self.load_selected_words(loader, page_number, cancel).await?;
        let mapped = self.classify(page_number, &words, full, partial, Some(cancel))?;
        self.selected_words[page_number - 1] = Some(words);
        Ok(mapped)
    }

    /// Selected words of every selected page, in document order.
    ///
    /// Unrealised pages are loaded through `loader`. The per-page cache is
    /// only updated once every page has been computed.
    ///
    /// # Errors
    ///
    /// - `Cancelled` when `cancel` fires; the selection is left untouched
    /// - any error of the loader
    pub async fn get_document_selection_as_async<L, T, F, P>(
        &mut self,
        loader: &L,
        mut full: F,
        mut partial: P,
        cancel: &CancelFlag,
    ) -> Result<Vec<T>>
    where
        L: TextLayerLoader + ?Sized,
        F: FnMut(&Word) -> T,
        P: FnMut(&Word, usize, usize) -> T,
    {
        let Some(pages) = self.get_selected_pages_indexes() else {
            return Ok(Vec::new());
        };

        let mut computed = Vec::new();
        for page_number in pages {
            cancel.check()?;
            let words = match self.selected_words_for_page(page_number) {
                Some(words) => words.to_vec(),
                None => self.load_selected_words(loader, page_number, cancel).await?,
            };
            computed.push((page_number, words));
        }

        let mut mapped = Vec::new();
        for (page_number, words) in &computed {
            cancel.check()?;
            let page = self.classify(*page_number, words, &mut full, &mut partial, Some(cancel))?;
            mapped.extend(page);
        }
        log::debug!(
            "Document selection: {} pages, {} items",
            computed.len(),
            mapped.len()
        );
        for (page_number, words) in computed {
            self.selected_words[page_number - 1] = Some(words);
        }
        Ok(mapped)
    }

    async fn load_selected_words<L>(
        &self,
        loader: &L,
        page_number: usize,
        cancel: &CancelFlag,
    ) -> Result<Vec<Word>>
    where
        L: TextLayerLoader + ?Sized,
    {
        cancel.check()?;
        let layer = match loader.realized_layer(page_number) {
            Some(layer) => layer,
            None => loader.load_interactive_layer(page_number, cancel).await?,
        };
        cancel.check()?;
        self.select_words_in_range(page_number, &layer, Some(cancel))
    }
}
