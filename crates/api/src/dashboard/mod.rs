//! Owner dashboard: the project form, the project list view, and the
//! notices they surface to the rendered page.

pub mod form;
pub mod list;
pub mod notice;

pub use form::{FormMode, ProjectForm, SubmitError, SubmitGuard};
pub use list::{ListError, MountError, ProjectList};
pub use notice::{Notice, NoticeKind};
