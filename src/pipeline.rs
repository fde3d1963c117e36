//! End-to-end operations composed from resolution, synthesis and writing.

use std::path::PathBuf;

use crate::alias::ImportAliasTable;
use crate::config::Config;
use crate::context::ServiceContext;
use crate::destination::Destination;
use crate::error::Result;
use crate::resolve::{resolve, PackageSpec};
use crate::synth::{synthesize, GeneratedMock};
use crate::writer::MockWriter;

/// Resolves every spec and synthesizes one mock per package, in spec order.
///
/// One import alias table is shared by the whole run.
///
/// # Errors
///
/// Propagates resolution and synthesis failures; nothing is written.
pub fn generate_mocks(ctx: &ServiceContext, specs: &[PackageSpec]) -> Result<Vec<GeneratedMock>> {
    let mut aliases = ImportAliasTable::new();
    let packages = resolve(ctx.loader.as_ref(), specs, &mut aliases)?;

    let mut mocks = Vec::with_capacity(packages.len());
    for package in packages {
        let source = synthesize(&package, &mut aliases)?;
        mocks.push(GeneratedMock { package, source });
    }
    tracing::info!(packages = mocks.len(), "generated mocks");
    Ok(mocks)
}

/// Writes `mocks` under the destinations `config` describes.
///
/// # Errors
///
/// Returns [`crate::Error::Write`] aggregating every failed mock; the
/// others are still written.
pub fn write_mocks(
    ctx: &ServiceContext,
    config: &Config,
    mocks: &[GeneratedMock],
) -> Result<Vec<PathBuf>> {
    let written = MockWriter::new(ctx, config.destinations()).write(mocks)?;
    tracing::info!(files = written.len(), "wrote mocks");
    Ok(written)
}

/// Where each spec's mock would be written, without touching the disk.
///
/// # Errors
///
/// Returns [`crate::Error::Destination`] for the first package that cannot
/// be placed.
pub fn plan_destinations(config: &Config, specs: &[PackageSpec]) -> Result<Vec<Destination>> {
    let resolver = config.destinations();
    specs.iter().map(|spec| resolver.resolve(&spec.path)).collect()
}

/// Removes stale files and directories from the mock roots of `specs`.
///
/// Every destination is resolved before anything is listed or removed.
///
/// # Errors
///
/// Returns the first destination, listing or removal failure.
pub fn tidy_mocks(ctx: &ServiceContext, config: &Config, specs: &[PackageSpec]) -> Result<Vec<PathBuf>> {
    let destinations = plan_destinations(config, specs)?;
    let removed = MockWriter::new(ctx, config.destinations()).tidy(&destinations)?;
    tracing::info!(removed = removed.len(), "tidied mock directories");
    Ok(removed)
}

/// Lists what [`tidy_mocks`] would remove.
///
/// # Errors
///
/// Returns the first destination or listing failure.
pub fn stale_mocks(ctx: &ServiceContext, config: &Config, specs: &[PackageSpec]) -> Result<Vec<PathBuf>> {
    let destinations = plan_destinations(config, specs)?;
    MockWriter::new(ctx, config.destinations()).stale_paths(&destinations)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, StaticPackageLoader};
    use crate::config::LoaderConfig;
    use crate::error::Error;
    use crate::resolve::fixtures::{basic, error_type, interface, method, named, package, var};

    fn config() -> Config {
        Config {
            module_path: "github.com/my/mod".into(),
            module_dir: PathBuf::from("/repo"),
            primary_mock_dir: PathBuf::from("internal/mocks"),
            private_mock_dir_name: "mocks".into(),
            tidy_after_generate: false,
            loader: LoaderConfig::Command("unused".into()),
            packages: Vec::new(),
        }
    }

    fn loader() -> StaticPackageLoader {
        StaticPackageLoader::new()
            .with_package(package(
                "github.com/my/mod/store",
                "store",
                vec![(
                    "Store",
                    interface(vec![method(
                        "Get",
                        vec![var(Some("key"), basic("string"))],
                        vec![var(None, named("github.com/my/mod/store", "store", "Item")), var(None, error_type())],
                    )]),
                )],
            ))
            .with_package(package(
                "github.com/my/mod/svc/internal/queue",
                "queue",
                vec![("Queue", interface(vec![method("Push", vec![var(None, basic("int"))], vec![])]))],
            ))
            .with_package(package(
                "github.com/other/lib/internal/x",
                "x",
                vec![("X", interface(vec![method("Do", vec![], vec![])]))],
            ))
    }

    fn context(fs: &MemoryFileSystem) -> ServiceContext {
        ServiceContext::new(Box::new(fs.clone()), Box::new(loader()))
    }

    fn specs() -> Vec<PackageSpec> {
        vec![
            PackageSpec::new("github.com/my/mod/store", ["Store"]),
            PackageSpec::new("github.com/my/mod/svc/internal/queue", ["Queue"]),
        ]
    }

    #[test]
    fn generate_and_write_is_idempotent() {
        let fs = MemoryFileSystem::new();
        let ctx = context(&fs);

        let first = write_mocks(&ctx, &config(), &generate_mocks(&ctx, &specs()).unwrap()).unwrap();
        let snapshot: Vec<_> = first.iter().map(|p| fs.file(p)).collect();
        let second = write_mocks(&ctx, &config(), &generate_mocks(&ctx, &specs()).unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(snapshot, second.iter().map(|p| fs.file(p)).collect::<Vec<_>>());
        assert_eq!(
            first,
            vec![
                PathBuf::from("/repo/internal/mocks/github.com/my/mod/mock_store/mock_store.go"),
                PathBuf::from("/repo/svc/internal/mocks/mock_queue/mock_queue.go"),
            ]
        );
    }

    #[test]
    fn duplicate_path_writes_nothing() {
        let fs = MemoryFileSystem::new();
        let ctx = context(&fs);
        let specs = vec![
            PackageSpec::new("github.com/my/mod/store", ["Store"]),
            PackageSpec::new("github.com/my/mod/store", ["Store"]),
        ];

        let err = generate_mocks(&ctx, &specs).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(fs.paths().is_empty());
    }

    #[test]
    fn foreign_private_package_fails_while_siblings_are_written() {
        let fs = MemoryFileSystem::new();
        let ctx = context(&fs);
        let mut specs = specs();
        specs.insert(1, PackageSpec::new("github.com/other/lib/internal/x", ["X"]));

        let mocks = generate_mocks(&ctx, &specs).unwrap();
        let err = write_mocks(&ctx, &config(), &mocks).unwrap_err();

        let Error::Write(failures) = err else {
            panic!("expected Write, got {err}");
        };
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            Error::Destination { ref package_path, .. } if package_path == "github.com/other/lib/internal/x"
        ));
        assert!(fs.file("/repo/svc/internal/mocks/mock_queue/mock_queue.go").is_some());
        assert!(fs.file("/repo/internal/mocks/github.com/my/mod/mock_store/mock_store.go").is_some());
    }

    #[test]
    fn tidy_after_generate_keeps_current_mocks() {
        let fs = MemoryFileSystem::new();
        let ctx = context(&fs);
        write_mocks(&ctx, &config(), &generate_mocks(&ctx, &specs()).unwrap()).unwrap();
        fs.insert_file("/repo/internal/mocks/github.com/my/mod/mock_gone/mock_gone.go", "old");

        let stale = stale_mocks(&ctx, &config(), &specs()).unwrap();
        assert_eq!(stale, vec![PathBuf::from("/repo/internal/mocks/github.com/my/mod/mock_gone")]);

        let removed = tidy_mocks(&ctx, &config(), &specs()).unwrap();
        assert_eq!(removed, stale);
        assert!(tidy_mocks(&ctx, &config(), &specs()).unwrap().is_empty());
    }

    #[test]
    fn tidy_aborts_before_deleting_when_a_destination_fails() {
        let fs = MemoryFileSystem::new();
        fs.insert_file("/repo/internal/mocks/stray.go", "old");
        let ctx = context(&fs);
        let specs = vec![
            PackageSpec::new("github.com/my/mod/store", ["Store"]),
            PackageSpec::new("github.com/other/lib/internal/x", ["X"]),
        ];

        let err = tidy_mocks(&ctx, &config(), &specs).unwrap_err();
        assert!(matches!(err, Error::Destination { .. }));
        assert!(fs.file(Path::new("/repo/internal/mocks/stray.go")).is_some());
    }
}
