//! URL helpers for registry resources and catalog links.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::error::{CatalogError, CatalogResult};
use crate::package::PackageRecord;

/// Characters that cannot appear raw inside one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Append an absolute registry path (`/package/...`) to the registry base,
/// keeping any path prefix the base already carries.
pub fn registry_url(base: &Url, path: &str) -> CatalogResult<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| CatalogError::Decode(format!("invalid URL {joined}: {e}")))
}

/// Absolute icon URL for a card, empty when the package has no usable icon
pub fn icon_url(base: &Url, package: &PackageRecord) -> String {
    let Some(icon) = package.icons.first() else {
        return String::new();
    };
    let path = icon.path.as_str();
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http") {
        return path.to_string();
    }
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

/// README path: the record's own path or the conventional docs location
pub fn readme_path(package: &PackageRecord) -> String {
    match package.readme.as_deref() {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => format!(
            "/package/{}/{}/docs/README.md",
            segment(&package.name),
            segment(&package.version)
        ),
    }
}

pub fn detail_path(name: &str, version: &str) -> String {
    format!("/package/{}/{}/", segment(name), segment(version))
}

pub fn sample_event_path(name: &str, version: &str, dataset: &str) -> String {
    format!(
        "/package/{}/{}/data_stream/{}/sample_event.json",
        segment(name),
        segment(version),
        segment(dataset)
    )
}

/// Download link for the package archive. Only linked, never fetched.
pub fn download_url(base: &Url, package: &PackageRecord) -> String {
    format!(
        "{}/epr/{name}/{name}-{version}.zip",
        base.as_str().trim_end_matches('/'),
        name = package.name,
        version = package.version
    )
}

pub fn screenshot_url(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

/// Link to the catalog's own detail view for a package
pub fn catalog_detail_link(
    site_base_url: &str,
    name: &str,
    kibana_version: Option<&str>,
    prerelease: bool,
) -> String {
    let mut link = format!("{site_base_url}integration?pkg={name}");
    if let Some(version) = kibana_version {
        link.push_str("&kibana_version=");
        link.push_str(version);
    }
    if prerelease {
        link.push_str("&prerelease=true");
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Icon;

    fn base() -> Url {
        Url::parse("https://epr.elastic.co").unwrap()
    }

    #[test]
    fn test_registry_url_keeps_base_prefix() {
        let base = Url::parse("https://mirror.example.com/registry/").unwrap();
        let url = registry_url(&base, "/package/nginx/1.0.0/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://mirror.example.com/registry/package/nginx/1.0.0/"
        );
    }

    #[test]
    fn test_icon_url_variants() {
        let mut pkg = PackageRecord::new("nginx", "1.0.0");
        assert_eq!(icon_url(&base(), &pkg), "");

        pkg.icons.push(Icon {
            path: "/package/nginx/1.0.0/img/logo.svg".into(),
        });
        assert_eq!(
            icon_url(&base(), &pkg),
            "https://epr.elastic.co/package/nginx/1.0.0/img/logo.svg"
        );

        pkg.icons[0].path = "https://cdn.example.com/logo.svg".into();
        assert_eq!(icon_url(&base(), &pkg), "https://cdn.example.com/logo.svg");

        pkg.icons[0].path = String::new();
        assert_eq!(icon_url(&base(), &pkg), "");
    }

    #[test]
    fn test_readme_path_default() {
        let mut pkg = PackageRecord::new("aws", "2.3.1");
        assert_eq!(readme_path(&pkg), "/package/aws/2.3.1/docs/README.md");
        pkg.readme = Some("/package/aws/2.3.1/docs/OTHER.md".into());
        assert_eq!(readme_path(&pkg), "/package/aws/2.3.1/docs/OTHER.md");
    }

    #[test]
    fn test_download_and_sample_paths() {
        let pkg = PackageRecord::new("aws", "2.3.1");
        assert_eq!(
            download_url(&base(), &pkg),
            "https://epr.elastic.co/epr/aws/aws-2.3.1.zip"
        );
        assert_eq!(
            sample_event_path("aws", "2.3.1", "aws.cloudtrail"),
            "/package/aws/2.3.1/data_stream/aws.cloudtrail/sample_event.json"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let url = registry_url(&base(), &detail_path("foo#bar", "1.0.0")).unwrap();
        assert_eq!(url.path(), "/package/foo%23bar/1.0.0/");
        assert!(url.fragment().is_none());

        assert_eq!(
            sample_event_path("a/b", "1.0.0", "x y?"),
            "/package/a%2Fb/1.0.0/data_stream/x%20y%3F/sample_event.json"
        );
        assert_eq!(detail_path("nginx", "1.20.0"), "/package/nginx/1.20.0/");
    }

    #[test]
    fn test_catalog_detail_link() {
        assert_eq!(
            catalog_detail_link("/", "nginx", Some("9.2.0"), true),
            "/integration?pkg=nginx&kibana_version=9.2.0&prerelease=true"
        );
        assert_eq!(
            catalog_detail_link("https://site/", "nginx", None, false),
            "https://site/integration?pkg=nginx"
        );
    }
}
