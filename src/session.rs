//! Interactive editor state.
//!
//! An [`EditorSession`] owns the current source, the current parameter tuple
//! and the last successful render. Every parameter change re-renders from
//! scratch; a change that fails validation is rejected and the previous
//! render stays on screen.
//!
//! ## Loads and staleness
//!
//! Decoding a file or fetching a generated image takes time, and the user may
//! pick another image before the first one arrives. Each load therefore
//! starts with [`EditorSession::begin_load`], which hands out a
//! monotonically increasing [`LoadTicket`]. When the bytes are ready the
//! caller passes the ticket back to [`EditorSession::complete_load`]; only
//! the most recently issued ticket is honoured and anything older is dropped
//! as [`LoadOutcome::Stale`].
//!
//! ```text
//! begin_load() → t1
//! begin_load() → t2
//! complete_load(t2, Ok(b))  → Applied   (b on screen)
//! complete_load(t1, Ok(a))  → Stale     (a discarded)
//! ```
//!
//! A successful [`EditorSession::update_params`] also advances the clock, so
//! a load still in flight when the user edits is discarded rather than
//! resetting the crop they just chose.

use crate::generation::GenerationError;
use crate::imaging::{
    CropRegion, DecodeError, MaskStats, OutputRaster, RenderError, RenderParams, SourceRaster,
    render_with_stats, validate_target_size,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("could not load image: {0}")]
    Decode(#[from] DecodeError),
    #[error("could not generate image: {0}")]
    Generation(#[from] GenerationError),
    #[error("could not render: {0}")]
    Render(#[from] RenderError),
}

/// Logical timestamp of one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The source was adopted and rendered.
    Applied,
    /// A newer load had already begun; the result was discarded.
    Stale,
}

#[derive(Debug)]
pub struct EditorSession {
    params: RenderParams,
    source: Option<Arc<SourceRaster>>,
    preview: Option<Arc<OutputRaster>>,
    mask: Option<MaskStats>,
    issued: u64,
}

impl EditorSession {
    pub fn new(params: RenderParams) -> Self {
        Self {
            params,
            source: None,
            preview: None,
            mask: None,
            issued: 0,
        }
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn source(&self) -> Option<&Arc<SourceRaster>> {
        self.source.as_ref()
    }

    /// Shared handle to the last successful render.
    pub fn preview(&self) -> Option<Arc<OutputRaster>> {
        self.preview.clone()
    }

    /// Mask counts of the last render, when masking was enabled.
    pub fn mask_stats(&self) -> Option<MaskStats> {
        self.mask
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Deliver the result of the load that `ticket` started.
    ///
    /// A newly adopted source gets a full-frame crop, since the previous
    /// crop rectangle belongs to the previous image. If the result is an
    /// error, or the source cannot be rendered, nothing changes.
    pub fn complete_load<E>(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceRaster, E>,
    ) -> Result<LoadOutcome, SessionError>
    where
        E: Into<SessionError>,
    {
        if ticket.0 != self.issued {
            warn!(ticket = ticket.0, latest = self.issued, "discarding stale load");
            return Ok(LoadOutcome::Stale);
        }
        let source = Arc::new(result.map_err(Into::into)?);
        let params = RenderParams {
            crop: CropRegion::full(source.bounds()),
            ..self.params
        };
        let rendered = render_with_stats(&source, &params)?;
        debug!(
            width = source.width(),
            height = source.height(),
            "source loaded"
        );
        self.source = Some(source);
        self.params = params;
        self.preview = Some(Arc::new(rendered.raster));
        self.mask = rendered.mask;
        Ok(LoadOutcome::Applied)
    }

    /// Replace the parameter tuple and re-render.
    ///
    /// Without a source only the target size is checked. On error the
    /// previous parameters and preview are kept. On success any pending load
    /// becomes stale.
    pub fn update_params(&mut self, params: RenderParams) -> Result<(), RenderError> {
        match &self.source {
            Some(source) => {
                let rendered = render_with_stats(source, &params)?;
                self.preview = Some(Arc::new(rendered.raster));
                self.mask = rendered.mask;
            }
            None => {
                validate_target_size(params.target)?;
            }
        }
        self.params = params;
        self.issued += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{GeometryError, Percent, TargetSize, ToleranceConfig};
    use crate::test_helpers::{gradient_source, solid_source};

    fn session() -> EditorSession {
        let params = RenderParams::full_frame(&solid_source(1, 1, [0, 0, 0, 255]), TargetSize::new(8, 6));
        EditorSession::new(params)
    }

    #[test]
    fn load_renders_with_full_frame_crop() {
        let mut s = session();
        let t = s.begin_load();
        let outcome = s
            .complete_load::<DecodeError>(t, Ok(gradient_source(40, 30)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(s.params().crop, CropRegion::new(0, 0, 40, 30));
        assert_eq!(s.preview().unwrap().size(), TargetSize::new(8, 6));
    }

    #[test]
    fn older_ticket_is_stale() {
        let mut s = session();
        let first = s.begin_load();
        let second = s.begin_load();

        s.complete_load::<DecodeError>(second, Ok(solid_source(4, 4, [1, 1, 1, 255])))
            .unwrap();
        let outcome = s
            .complete_load::<DecodeError>(first, Ok(solid_source(9, 9, [2, 2, 2, 255])))
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(s.source().unwrap().width(), 4);
    }

    #[test]
    fn stale_error_is_discarded_too() {
        let mut s = session();
        let first = s.begin_load();
        let _second = s.begin_load();
        let outcome = s
            .complete_load(first, Err(DecodeError::CorruptData("bad".into())))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
    }

    #[test]
    fn failed_load_keeps_previous_source() {
        let mut s = session();
        let t = s.begin_load();
        s.complete_load::<DecodeError>(t, Ok(gradient_source(10, 10))).unwrap();
        let before = s.preview().unwrap();

        let t = s.begin_load();
        let err = s.complete_load(t, Err(DecodeError::UnsupportedFormat("x".into())));
        assert!(matches!(err, Err(SessionError::Decode(_))));
        assert_eq!(s.source().unwrap().width(), 10);
        assert!(Arc::ptr_eq(&before, &s.preview().unwrap()));
    }

    #[test]
    fn invalid_update_keeps_previous_render() {
        let mut s = session();
        let t = s.begin_load();
        s.complete_load::<DecodeError>(t, Ok(gradient_source(20, 20))).unwrap();
        let before = s.preview().unwrap();
        let good = *s.params();

        let bad = RenderParams {
            crop: CropRegion::new(10, 10, 20, 20),
            ..good
        };
        let err = s.update_params(bad).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Geometry(GeometryError::OutOfBounds { .. })
        ));
        assert_eq!(*s.params(), good);
        assert!(Arc::ptr_eq(&before, &s.preview().unwrap()));
    }

    #[test]
    fn update_rerenders_and_tracks_mask() {
        let mut s = session();
        let t = s.begin_load();
        s.complete_load::<DecodeError>(t, Ok(solid_source(10, 10, [255, 255, 255, 255])))
            .unwrap();
        assert_eq!(s.mask_stats(), None);

        let mut params = *s.params();
        params.overlay.visible = false;
        params.tolerance = ToleranceConfig {
            enabled: true,
            tolerance: Percent::new(10.0),
            ..ToleranceConfig::default()
        };
        s.update_params(params).unwrap();

        let stats = s.mask_stats().unwrap();
        assert_eq!(stats.cleared, 48);
        assert!(s.preview().unwrap().as_image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn edit_during_pending_load_makes_it_stale() {
        let mut s = session();
        let t = s.begin_load();
        s.complete_load::<DecodeError>(t, Ok(gradient_source(40, 40))).unwrap();

        let pending = s.begin_load();
        let edited = RenderParams {
            crop: CropRegion::new(5, 5, 10, 10),
            ..*s.params()
        };
        s.update_params(edited).unwrap();
        let shown = s.preview().unwrap();

        let outcome = s
            .complete_load::<DecodeError>(pending, Ok(solid_source(9, 9, [2, 2, 2, 255])))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(s.params().crop, CropRegion::new(5, 5, 10, 10));
        assert_eq!(s.source().unwrap().width(), 40);
        assert!(Arc::ptr_eq(&shown, &s.preview().unwrap()));
    }

    #[test]
    fn rejected_edit_leaves_pending_load_current() {
        let mut s = session();
        let pending = s.begin_load();
        let mut bad = *s.params();
        bad.target = TargetSize::new(0, 5);
        assert!(s.update_params(bad).is_err());

        let outcome = s
            .complete_load::<DecodeError>(pending, Ok(gradient_source(12, 12)))
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Applied);
    }

    #[test]
    fn update_without_source_checks_target_only() {
        let mut s = session();
        let mut params = *s.params();
        params.target = TargetSize::new(0, 5);
        assert!(s.update_params(params).is_err());
        params.target = TargetSize::new(3, 5);
        s.update_params(params).unwrap();
        assert!(s.preview().is_none());
    }
}
