//! End-to-end lifecycle test against a locally built distribution archive:
//! resolve -> unpack -> install -> copy, without touching the network.

use std::fs;
use std::path::{Path, PathBuf};

use nuopkg::{ClientPackage, PackagingConfig, PackagingError, StageCopier, Target};
use tempfile::TempDir;

const VERSION: &str = "4.3.1";

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Lay out a minimal but complete Linux distribution tree.
fn build_distribution_tree(root: &Path) {
    write_file(&root.join("bin/nuosql"), "#!/bin/sh\n");
    write_file(&root.join("bin/nuoloader"), "#!/bin/sh\n");

    write_file(&root.join("lib64/libNuoODBC.so"), "odbc");
    write_file(&root.join("lib64/libNuoRemote.so"), "remote");
    write_file(&root.join("lib64/libnuoclient.so"), "client");
    write_file(&root.join("lib64/libicuuc.so.48"), "icu");
    write_file(&root.join("lib64/libicudata.so.48"), "icu-data");
    write_file(&root.join("lib64/libmpir.so.23"), "mpir");

    write_file(&root.join("jar/nuodbmanager.jar"), "jar");

    write_file(&root.join("include/NuoDB.h"), "// NuoDB.h");
    write_file(&root.join("include/SQLException.h"), "// SQLException.h");
    write_file(
        &root.join("include/SQLExceptionConstants.h"),
        "// constants",
    );
    write_file(&root.join("include/NuoRemote/RemoteConnection.h"), "// hpp");
    write_file(&root.join("include/nuodb/nuodb.h"), "// h");

    write_file(&root.join("samples/doc/cpp/example.cpp"), "// cpp sample");
    write_file(&root.join("samples/doc/c/example.c"), "/* c sample */");

    write_file(&root.join("README.txt"), "readme");
    write_file(&root.join("ce_license.txt"), "license");
}

fn pack_tar_gz(tree: &Path, top_dir: &str, dest: &Path) {
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    let file = fs::File::create(dest).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(top_dir, tree).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// A resolved package with its archive already sitting in the local cache,
/// plus the companion script directories the install step references.
fn prepared_package(temp: &TempDir) -> (ClientPackage, PackagingConfig) {
    let config = PackagingConfig::new(Target::Lin64)
        .with_cache_dir(temp.path().join("cache"))
        .with_pkg_root(temp.path().join("pkg"))
        .with_output_root(temp.path().join("dist"))
        .with_bin_dir(temp.path().join("scripts/bin"))
        .with_etc_dir(temp.path().join("scripts/etc"));

    write_file(&config.bin_dir.join("nuodbmgr"), "#!/bin/sh\n");
    write_file(&config.etc_dir.join("run-java-app.sh"), "#!/bin/sh\n");

    let mut package = ClientPackage::new(Target::Lin64);
    package.resolve(VERSION, &config).unwrap();

    let tree = temp.path().join("fixture");
    build_distribution_tree(&tree);
    pack_tar_gz(
        &tree,
        &Target::Lin64.dir_name(VERSION),
        package.archive().unwrap().path(),
    );

    (package, config)
}

#[test]
fn full_lifecycle_stages_every_product() {
    let temp = TempDir::new().unwrap();
    let (mut package, config) = prepared_package(&temp);

    let tree = package.unpack(&config.pkg_root).unwrap();
    assert_eq!(
        tree,
        config.pkg_root.join("nuodb-ce-4.3.1.linux.x86_64")
    );

    package.install(&config).unwrap();

    let copier = StageCopier::new(&config.output_root);
    for stage in package.stages() {
        let copied = copier.run(stage).unwrap();
        assert!(copied > 0, "stage {} copied nothing", stage.name());
    }

    let dist = &config.output_root;
    assert!(dist.join("nuosql/bin/nuosql").exists());
    assert!(dist.join("nuoloader/bin/nuoloader").exists());
    assert!(dist.join("nuoodbc/lib64/libNuoODBC.so").exists());

    // Glob-matched runtime libraries land next to each native product
    assert!(dist.join("nuosql/lib64/libicuuc.so.48").exists());
    assert!(dist.join("nuosql/lib64/libicudata.so.48").exists());
    assert!(dist.join("nuoodbc/lib64/libmpir.so.23").exists());

    // Management tool: jar from the archive, scripts from outside it
    assert!(dist.join("nuodbmgr/jar/nuodbmanager.jar").exists());
    assert!(dist.join("nuodbmgr/bin/nuodbmgr").exists());
    assert!(dist.join("nuodbmgr/etc/run-java-app.sh").exists());

    // Driver headers and samples
    assert!(dist.join("nuoremote/include/NuoDB.h").exists());
    assert!(dist
        .join("nuoremote/include/NuoRemote/RemoteConnection.h")
        .exists());
    assert!(dist.join("nuoremote/samples/cpp/example.cpp").exists());
    assert!(dist.join("nuoclient/include/nuodb/nuodb.h").exists());
    assert!(dist.join("nuoclient/samples/c/example.c").exists());

    // Every stage receives the common docs
    for stage in package.stages() {
        assert!(dist.join(stage.name()).join("doc/README.txt").exists());
        assert!(dist.join(stage.name()).join("doc/ce_license.txt").exists());
    }
}

#[test]
fn unpack_destructively_resets_the_package_root() {
    let temp = TempDir::new().unwrap();
    let (mut package, config) = prepared_package(&temp);

    package.unpack(&config.pkg_root).unwrap();

    let stale = config.pkg_root.join("stale-leftover.txt");
    fs::write(&stale, "from a previous run").unwrap();

    let tree = package.unpack(&config.pkg_root).unwrap();
    assert!(!stale.exists());
    assert!(tree.join("README.txt").exists());
}

#[test]
fn missing_extracted_file_aborts_staging() {
    let temp = TempDir::new().unwrap();
    let config = PackagingConfig::new(Target::Lin64)
        .with_cache_dir(temp.path().join("cache"))
        .with_pkg_root(temp.path().join("pkg"))
        .with_output_root(temp.path().join("dist"))
        .with_bin_dir(temp.path().join("scripts/bin"))
        .with_etc_dir(temp.path().join("scripts/etc"));

    // A degenerate archive: only the readme survived "extraction"
    let tree = temp.path().join("fixture");
    write_file(&tree.join("README.txt"), "readme");

    let mut package = ClientPackage::new(Target::Lin64);
    package.resolve(VERSION, &config).unwrap();
    pack_tar_gz(
        &tree,
        &Target::Lin64.dir_name(VERSION),
        package.archive().unwrap().path(),
    );

    package.unpack(&config.pkg_root).unwrap();
    package.install(&config).unwrap();

    let copier = StageCopier::new(&config.output_root);
    let nuosql = package.stage("nuosql").unwrap();
    let result = copier.run(nuosql);

    assert!(matches!(
        result,
        Err(PackagingError::StagingFailed { .. })
    ));
}

#[test]
fn plans_are_deterministic_per_platform() {
    let temp = TempDir::new().unwrap();
    let (mut package, config) = prepared_package(&temp);

    package.unpack(&config.pkg_root).unwrap();
    package.install(&config).unwrap();

    // Same declaration twice would double the plan; the lifecycle runs it once
    let op_counts: Vec<(String, usize)> = package
        .stages()
        .map(|s| (s.name().to_string(), s.ops().len()))
        .collect();

    for (name, count) in &op_counts {
        assert!(*count > 0, "stage {} has an empty plan", name);
    }

    // nuosql: bin + shared libs + doc
    let nuosql = op_counts
        .iter()
        .find(|(name, _)| name == "nuosql")
        .map(|(_, count)| *count)
        .unwrap();
    assert_eq!(nuosql, 3);
}

#[test]
fn base_dirs_point_into_the_extracted_tree() {
    let temp = TempDir::new().unwrap();
    let (mut package, config) = prepared_package(&temp);

    let tree = package.unpack(&config.pkg_root).unwrap();
    let expected: PathBuf = config.pkg_root.join(Target::Lin64.dir_name(VERSION));
    assert_eq!(tree, expected);

    for stage in package.stages() {
        assert_eq!(stage.base_dir(), Some(expected.as_path()));
    }
}
