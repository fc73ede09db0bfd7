use tokio_util::sync::CancellationToken;

/// Liveness of an editing surface.
///
/// Work scheduled on behalf of a surface holds a clone and checks it before
/// touching the surface. Tearing the surface down cancels every clone at
/// once; pending work observes that as cancellation, not failure.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLifetime {
	cancel: CancellationToken,
}

impl SurfaceLifetime {
	/// Creates a live surface lifetime.
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks the surface as torn down.
	pub fn teardown(&self) {
		self.cancel.cancel();
	}

	/// Returns true once the surface has been torn down.
	pub fn is_torn_down(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Future resolving when the surface is torn down.
	pub async fn torn_down(&self) {
		self.cancel.cancelled().await;
	}
}
