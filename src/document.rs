//! Per-document text layers, loaded lazily and memoised per page.
//!
//! Glyph decoding lives outside this crate behind [`GlyphSource`]. The
//! [`DocumentTextLayers`] loader runs the page pipeline on first access and
//! publishes the finished layer; readers never observe a partially built
//! layer, and a cancelled or failed load leaves the page unloaded so that a
//! retry starts from scratch.

use crate::error::{Error, Result};
use crate::layout::Letter;
use crate::pipeline::TextLayerPipeline;
use crate::selection::CancelFlag;
use crate::text_layer::{Annotation, TextLayer};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Decoded content of one page.
#[derive(Debug, Clone, Default)]
pub struct PageGlyphs {
    /// Glyphs in content stream order
    pub letters: Vec<Letter>,
    /// Link annotations of the page
    pub annotations: Vec<Annotation>,
}

/// Supplier of decoded glyphs, typically a PDF content stream interpreter.
#[async_trait]
pub trait GlyphSource: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Decode the glyphs of a 1-based page.
    async fn load_glyphs(&self, page_number: usize) -> Result<PageGlyphs>;
}

/// Access to the text layers of a document.
#[async_trait]
pub trait TextLayerLoader: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Layer of a page that is already built, without loading anything.
    fn realized_layer(&self, page_number: usize) -> Option<Arc<TextLayer>>;

    /// Layer of a page, building it if needed.
    async fn load_interactive_layer(
        &self,
        page_number: usize,
        cancel: &CancelFlag,
    ) -> Result<Arc<TextLayer>>;
}

/// Memoising [`TextLayerLoader`] over a [`GlyphSource`].
pub struct DocumentTextLayers<S> {
    source: S,
    pipeline: TextLayerPipeline,
    pages: Vec<OnceCell<Arc<TextLayer>>>,
}

impl<S: GlyphSource> DocumentTextLayers<S> {
    /// Create a loader with the default pipeline.
    pub fn new(source: S) -> Self {
        Self::with_pipeline(source, TextLayerPipeline::new())
    }

    /// Create a loader with a custom pipeline.
    pub fn with_pipeline(source: S, pipeline: TextLayerPipeline) -> Self {
        let pages = (0..source.page_count()).map(|_| OnceCell::new()).collect();
        Self {
            source,
            pipeline,
            pages,
        }
    }

    /// The underlying glyph source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The pipeline used to build layers.
    pub fn pipeline(&self) -> &TextLayerPipeline {
        &self.pipeline
    }

    fn cell(&self, page_number: usize) -> Result<&OnceCell<Arc<TextLayer>>> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| Error::page_out_of_range(page_number, self.pages.len()))
    }

    /// Drop the layer of a page. Returns it if it was loaded.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a page number outside the document.
    pub fn unload_page(&mut self, page_number: usize) -> Result<Option<Arc<TextLayer>>> {
        let page_count = self.pages.len();
        let cell = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get_mut(i))
            .ok_or_else(|| Error::page_out_of_range(page_number, page_count))?;
        Ok(cell.take())
    }

    /// Drop every loaded layer.
    pub fn unload_all(&mut self) {
        for cell in &mut self.pages {
            cell.take();
        }
    }

    /// Number of pages whose layer is currently built.
    pub fn loaded_page_count(&self) -> usize {
        self.pages.iter().filter(|cell| cell.initialized()).count()
    }
}

#[async_trait]
impl<S: GlyphSource> TextLayerLoader for DocumentTextLayers<S> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn realized_layer(&self, page_number: usize) -> Option<Arc<TextLayer>> {
        self.cell(page_number).ok()?.get().cloned()
    }

    async fn load_interactive_layer(
        &self,
        page_number: usize,
        cancel: &CancelFlag,
    ) -> Result<Arc<TextLayer>> {
        let cell = self.cell(page_number)?;
        cancel.check()?;

        let layer = cell
            .get_or_try_init(|| async {
                let glyphs = self.source.load_glyphs(page_number).await?;
                cancel.check()?;
                let layer =
                    self.pipeline
                        .process_page(page_number, glyphs.letters, glyphs.annotations)?;
                log::debug!("Built text layer for page {} ({} words)", page_number, layer.count());
                Ok::<_, Error>(Arc::new(layer))
            })
            .await?;
        Ok(Arc::clone(layer))
    }
}

impl<S> std::fmt::Debug for DocumentTextLayers<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentTextLayers")
            .field("page_count", &self.pages.len())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::OrientedRect;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One word per page; page 2 fails to decode until `fail_page_two` is cleared.
    struct CountingSource {
        pages: usize,
        loads: AtomicUsize,
        fail_page_two: std::sync::atomic::AtomicBool,
    }

    impl CountingSource {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                loads: AtomicUsize::new(0),
                fail_page_two: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl GlyphSource for CountingSource {
        fn page_count(&self) -> usize {
            self.pages
        }

        async fn load_glyphs(&self, page_number: usize) -> Result<PageGlyphs> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if page_number == 2 && self.fail_page_two.load(Ordering::SeqCst) {
                return Err(Error::PageLoad {
                    page_number,
                    reason: "corrupt content stream".to_string(),
                });
            }
            let letters = "page"
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    let x = i as f64 * 6.0;
                    let bbox = OrientedRect::from_edges(x, 0.0, x + 6.0, 10.0);
                    Letter::new(c.to_string(), bbox, 10.0, i)
                })
                .collect();
            Ok(PageGlyphs {
                letters,
                annotations: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_layers_are_memoised() {
        let layers = DocumentTextLayers::new(CountingSource::new(3));
        let cancel = CancelFlag::new();
        assert!(layers.realized_layer(1).is_none());

        let first = layers.load_interactive_layer(1, &cancel).await.unwrap();
        let second = layers.load_interactive_layer(1, &cancel).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(layers.source().loads.load(Ordering::SeqCst), 1);
        assert!(layers.realized_layer(1).is_some());
        assert_eq!(layers.loaded_page_count(), 1);
        assert_eq!(first.text(), "page");
    }

    #[tokio::test]
    async fn test_out_of_range_pages() {
        let layers = DocumentTextLayers::new(CountingSource::new(2));
        let cancel = CancelFlag::new();
        assert!(matches!(
            layers.load_interactive_layer(0, &cancel).await,
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            layers.load_interactive_layer(3, &cancel).await,
            Err(Error::OutOfRange { .. })
        ));
        assert!(layers.realized_layer(0).is_none());
    }

    #[tokio::test]
    async fn test_cancelled_load_leaves_page_unloaded() {
        let layers = DocumentTextLayers::new(CountingSource::new(2));
        let cancel = CancelFlag::new();
        cancel.cancel();
        assert!(matches!(
            layers.load_interactive_layer(1, &cancel).await,
            Err(Error::Cancelled)
        ));
        assert!(layers.realized_layer(1).is_none());

        let layer = layers.load_interactive_layer(1, &CancelFlag::new()).await.unwrap();
        assert_eq!(layer.page_number(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let source = CountingSource::new(2);
        source.fail_page_two.store(true, Ordering::SeqCst);
        let layers = DocumentTextLayers::new(source);
        let cancel = CancelFlag::new();

        assert!(matches!(
            layers.load_interactive_layer(2, &cancel).await,
            Err(Error::PageLoad { page_number: 2, .. })
        ));
        assert!(layers.realized_layer(2).is_none());

        layers.source().fail_page_two.store(false, Ordering::SeqCst);
        assert!(layers.load_interactive_layer(2, &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn test_unload_page() {
        let mut layers = DocumentTextLayers::new(CountingSource::new(2));
        let cancel = CancelFlag::new();
        layers.load_interactive_layer(2, &cancel).await.unwrap();

        assert!(layers.unload_page(2).unwrap().is_some());
        assert!(layers.unload_page(2).unwrap().is_none());
        assert!(layers.unload_page(5).is_err());

        layers.load_interactive_layer(1, &cancel).await.unwrap();
        layers.unload_all();
        assert_eq!(layers.loaded_page_count(), 0);
        assert_eq!(layers.source().loads.load(Ordering::SeqCst), 2);
    }
}
