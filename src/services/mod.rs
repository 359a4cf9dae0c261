pub mod asset_resolver;
pub mod cleanup;
pub mod manifest;
pub mod runtime_provisioner;
pub mod workspace_archiver;

pub use asset_resolver::{pick_exact_match, AssetResolver};
pub use cleanup::Cleanup;
pub use manifest::build_tree;
pub use runtime_provisioner::{PinnedBuild, ProvisionOutcome, RuntimeContext, RuntimeProvisioner};
pub use workspace_archiver::{archive_workspace, ArchiveEntry, WorkspaceArchiver};
