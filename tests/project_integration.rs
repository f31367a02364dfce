//! Integration tests for bumping project files on disk

use dotnet_bump::projects::{ProjectError, update_project};
use dotnet_bump::version::{VersionError, VersionPart};
use std::fs;
use tempfile::TempDir;

const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">

  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
    <Version>2.0.0</Version>
  </PropertyGroup>

  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>

</Project>
"#;

// ============================================================================
// MSBuild Project Tests
// ============================================================================

#[test]
fn test_csproj_bump_minor() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    fs::write(&csproj, CSPROJ).unwrap();

    let report = update_project(&csproj, VersionPart::Minor, None).unwrap();

    assert_eq!(report.path, csproj);
    assert_eq!(report.changes.len(), 1);
    assert_eq!(
        report.changes[0].to_string(),
        r#"Version updated from "2.0.0" to "2.1.0""#
    );

    let content = fs::read_to_string(&csproj).unwrap();
    assert_eq!(content, CSPROJ.replace("<Version>2.0.0</Version>", "<Version>2.1.0</Version>"));
    assert!(content.contains(r#"<PackageReference Include="Serilog" Version="3.1.1" />"#));
}

#[test]
fn test_csproj_bumps_every_version_field() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("Lib.csproj");
    fs::write(
        &csproj,
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <Version>1.4.0-beta</Version>
    <AssemblyVersion>1.4.0.0</AssemblyVersion>
  </PropertyGroup>
  <PropertyGroup>
    <FileVersion>1.4.0.12</FileVersion>
  </PropertyGroup>
</Project>
"#,
    )
    .unwrap();

    let report = update_project(&csproj, VersionPart::Build, None).unwrap();
    let lines: Vec<String> = report.changes.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            r#"Version updated from "1.4.0-beta" to "1.4.1-beta""#,
            r#"AssemblyVersion updated from "1.4.0.0" to "1.4.1.0""#,
            r#"FileVersion updated from "1.4.0.12" to "1.4.1.12""#,
        ]
    );

    let content = fs::read_to_string(&csproj).unwrap();
    assert!(content.contains("<Version>1.4.1-beta</Version>"));
    assert!(content.contains("<AssemblyVersion>1.4.1.0</AssemblyVersion>"));
    assert!(content.contains("<FileVersion>1.4.1.12</FileVersion>"));
}

#[test]
fn test_floating_marker_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    fs::write(
        &csproj,
        "<Project>\n  <PropertyGroup>\n    <Version>1.2.3-*</Version>\n  </PropertyGroup>\n</Project>\n",
    )
    .unwrap();

    update_project(&csproj, VersionPart::Build, None).unwrap();

    let content = fs::read_to_string(&csproj).unwrap();
    assert!(content.contains("<Version>1.2.4-*</Version>"), "{content}");
}

#[test]
fn test_suffix_override() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    fs::write(&csproj, CSPROJ).unwrap();

    update_project(&csproj, VersionPart::Major, Some("rc1")).unwrap();

    let content = fs::read_to_string(&csproj).unwrap();
    assert!(content.contains("<Version>3.0.0-rc1</Version>"));
}

#[test]
fn test_absent_component_is_promoted() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    fs::write(&csproj, "<Project><PropertyGroup><Version>1.9</Version></PropertyGroup></Project>").unwrap();

    let report = update_project(&csproj, VersionPart::Build, None).unwrap();
    assert_eq!(report.changes[0].new, "1.9.1");
}

#[test]
fn test_no_version_field_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    let original = "<Project Sdk=\"Microsoft.NET.Sdk\">\r\n  <PropertyGroup>\r\n    <TargetFramework>net8.0</TargetFramework>\r\n  </PropertyGroup>\r\n</Project>";
    fs::write(&csproj, original).unwrap();

    let report = update_project(&csproj, VersionPart::Fix, None).unwrap();

    assert!(report.is_unchanged());
    assert_eq!(fs::read(&csproj).unwrap(), original.as_bytes());
}

#[test]
fn test_malformed_field_aborts_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    let original = r#"<Project>
  <PropertyGroup>
    <Version>1.0.0</Version>
    <FileVersion>$(Version).0</FileVersion>
  </PropertyGroup>
</Project>
"#;
    fs::write(&csproj, original).unwrap();

    let err = update_project(&csproj, VersionPart::Major, None).unwrap_err();

    assert!(err.chain().any(|e| matches!(
        e.downcast_ref::<ProjectError>(),
        Some(ProjectError::InvalidField { tag, .. }) if tag == "FileVersion"
    )));
    match err.root_cause().downcast_ref::<VersionError>() {
        Some(VersionError::Unparsable(text)) => assert_eq!(text, "$(Version).0"),
        other => panic!("expected Unparsable, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&csproj).unwrap(), original);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("Missing.csproj");

    let err = update_project(&csproj, VersionPart::Major, None).unwrap_err();
    assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn test_wildcard_version_fails() {
    let temp_dir = TempDir::new().unwrap();
    let csproj = temp_dir.path().join("App.csproj");
    fs::write(&csproj, "<Project><PropertyGroup><Version>*</Version></PropertyGroup></Project>").unwrap();

    let err = update_project(&csproj, VersionPart::Major, None).unwrap_err();
    assert!(matches!(
        err.root_cause().downcast_ref::<VersionError>(),
        Some(VersionError::Wildcard)
    ));
}

// ============================================================================
// project.json Tests
// ============================================================================

#[test]
fn test_project_json_bump_revision() {
    let temp_dir = TempDir::new().unwrap();
    let project_json = temp_dir.path().join("project.json");
    fs::write(
        &project_json,
        r#"{
  "version": "1.0.0-*",
  "dependencies": {
    "NETStandard.Library": "1.6.0"
  },
  "frameworks": {
    "netstandard1.6": {}
  }
}"#,
    )
    .unwrap();

    let report = update_project(&project_json, VersionPart::Fix, None).unwrap();
    assert_eq!(
        report.changes[0].to_string(),
        r#"version updated from "1.0.0-*" to "1.0.0.1-*""#
    );

    let content = fs::read_to_string(&project_json).unwrap();
    assert_eq!(
        content,
        r#"{
  "version": "1.0.0.1-*",
  "dependencies": {
    "NETStandard.Library": "1.6.0"
  },
  "frameworks": {
    "netstandard1.6": {}
  }
}"#
    );
}

#[test]
fn test_project_json_without_version_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let project_json = temp_dir.path().join("project.json");
    let original = "{\"dependencies\":{}}";
    fs::write(&project_json, original).unwrap();

    let report = update_project(&project_json, VersionPart::Major, None).unwrap();

    assert!(report.is_unchanged());
    assert_eq!(fs::read_to_string(&project_json).unwrap(), original);
}

#[test]
fn test_project_json_invalid_json_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project_json = temp_dir.path().join("project.json");
    fs::write(&project_json, "{ \"version\": ").unwrap();

    assert!(update_project(&project_json, VersionPart::Major, None).is_err());
}
