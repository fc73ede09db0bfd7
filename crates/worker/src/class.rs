/// How a highlighter task is scheduled.
///
/// The class only tags spawns in the trace log and selects async versus blocking
/// execution; it carries no priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Timers that end in a dispatch to the surface, such as the deferred first pass.
	Interactive,
	/// Grammar loads and the follow-up passes that wait on them.
	Background,
	/// Grammar compilation and other CPU-bound work kept off the runtime threads.
	CpuBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::CpuBlocking => "cpu_blocking",
		}
	}

	/// Whether tasks of this class belong on the blocking pool.
	pub const fn is_blocking(self) -> bool {
		matches!(self, Self::CpuBlocking)
	}
}
