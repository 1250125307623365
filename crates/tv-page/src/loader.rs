//! In-page data loader.
//!
//! Every dataset is represented by one marker element:
//!
//! ```html
//! <script type="text/plain" data-dataset="sales" data-format="csv_embedded">…</script>
//! <script type="text/plain" data-dataset="sales" data-format="parquet" data-src="data/sales.parquet"></script>
//! ```
//!
//! [`LOADER_JS`] finds markers by dataset name and exposes
//! `tvData.load(name)`, a promise of an array of row objects, whatever the
//! format. Missing cells load as `null`.

use tv_data::{DataFormat, Locator};

use crate::escape::{escape_script_text, html_escape};
use crate::scripts::ScriptLibrary;

/// Loader script. Uses PapaParse for CSV and hyparquet for parquet.
pub const LOADER_JS: &str = r#"(function () {
  'use strict';
  var cache = {};

  function unescapeBlob(text) {
    return text.replace(/\\([\\\/!])/g, '$1');
  }

  function findMarker(name) {
    var nodes = document.querySelectorAll('script[data-dataset]');
    for (var i = 0; i < nodes.length; i++) {
      if (nodes[i].getAttribute('data-dataset') === name) return nodes[i];
    }
    return null;
  }

  function parseCsv(text) {
    if (!text) return [];
    var parsed = Papa.parse(text, { header: true, skipEmptyLines: true, dynamicTyping: true });
    return parsed.data.map(function (row) {
      Object.keys(row).forEach(function (k) { if (row[k] === '') row[k] = null; });
      return row;
    });
  }

  function fetchOk(url) {
    return fetch(url).then(function (response) {
      if (!response.ok) throw new Error('tabviz: cannot load ' + url + ' (' + response.status + ')');
      return response;
    });
  }

  function hyparquetModule() {
    return new Promise(function (resolve) {
      if (window.hyparquet) return resolve(window.hyparquet);
      window.addEventListener('tv-hyparquet-ready', function () { resolve(window.hyparquet); }, { once: true });
    });
  }

  function readParquet(url) {
    return Promise.all([hyparquetModule(), fetchOk(url).then(function (r) { return r.arrayBuffer(); })])
      .then(function (parts) {
        return new Promise(function (resolve, reject) {
          // Files without row groups may finish without calling onComplete.
          Promise.resolve(parts[0].parquetRead({ file: parts[1], rowFormat: 'object', onComplete: resolve }))
            .then(function () { resolve([]); }, reject);
        });
      });
  }

  function fetchDataset(name) {
    var marker = findMarker(name);
    if (!marker) return Promise.reject(new Error('tabviz: unknown dataset ' + name));
    var src = marker.getAttribute('data-src');
    switch (marker.getAttribute('data-format')) {
      case 'csv_embedded':
        return Promise.resolve(parseCsv(unescapeBlob(marker.textContent)));
      case 'json_embedded':
        return Promise.resolve(JSON.parse(unescapeBlob(marker.textContent) || '[]'));
      case 'csv_external':
        return fetchOk(src).then(function (r) { return r.text(); }).then(parseCsv);
      case 'json_external':
        return fetchOk(src).then(function (r) { return r.json(); });
      case 'parquet':
        return readParquet(src);
      default:
        return Promise.reject(new Error('tabviz: unsupported data format for ' + name));
    }
  }

  window.tvData = {
    load: function (name) {
      if (!cache[name]) cache[name] = fetchDataset(name);
      return cache[name];
    }
  };
})();"#;

/// Libraries the loader needs for a format.
pub fn loader_scripts(format: DataFormat) -> Vec<ScriptLibrary> {
    match format {
        DataFormat::CsvEmbedded | DataFormat::CsvExternal => vec![ScriptLibrary::PapaParse],
        DataFormat::Parquet => vec![ScriptLibrary::Hyparquet],
        DataFormat::JsonEmbedded | DataFormat::JsonExternal => Vec::new(),
    }
}

/// Marker element for one dataset.
pub fn dataset_marker(name: &str, locator: &Locator) -> String {
    match locator {
        Locator::Inline { format, blob } => format!(
            "<script type=\"text/plain\" data-dataset=\"{}\" data-format=\"{}\">{}</script>",
            html_escape(name),
            format,
            escape_script_text(blob)
        ),
        Locator::External { format, path } => format!(
            "<script type=\"text/plain\" data-dataset=\"{}\" data-format=\"{}\" data-src=\"{}\"></script>",
            html_escape(name),
            format,
            html_escape(path)
        ),
    }
}
