//! End-to-end migration runs over fixture projects
//!
//! Each test lays out a small project in a temp directory, runs the whole
//! pipeline and checks the usage graph, counters and written artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use schema_migrate::config::{ImportMapping, PathMapping, SourceConfig};
use schema_migrate::{run, MigrationConfig, MigrationDiagnostic, ProcessingResult, SkipReason};

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("expected {} to exist: {}", rel, e))
}

fn config(root: &Path) -> MigrationConfig {
    MigrationConfig {
        project_root: root.to_path_buf(),
        models: SourceConfig {
            import_alias: Some("my-app/models".to_string()),
            directory: Some(PathBuf::from("app/models")),
            additional: Vec::new(),
        },
        mixins: SourceConfig {
            import_alias: Some("my-app/mixins".to_string()),
            directory: Some(PathBuf::from("app/mixins")),
            additional: Vec::new(),
        },
        ..Default::default()
    }
}

const TIMESTAMPED: &str = r#"import Mixin from '@ember/object/mixin';
import { attr } from '@ember-data/model';
import Auditable from './auditable';

export default Mixin.create(Auditable, {
  createdAt: attr('date')
});
"#;

const AUDITABLE: &str = r#"import Mixin from '@ember/object/mixin';
import { attr } from '@ember-data/model';

export default Mixin.create({
  auditLog: attr('string')
});
"#;

const UNUSED: &str = r#"import Mixin from '@ember/object/mixin';
import { attr } from '@ember-data/model';

export default Mixin.create({
  neverRead: attr('boolean')
});
"#;

/// user → timestamped → auditable, plus an unimported mixin
fn scenario_a(root: &Path) {
    write(
        root,
        "app/models/user.js",
        r#"import Model, { attr } from '@ember-data/model';
import Timestamped from '../mixins/timestamped';

export default class User extends Model.extend(Timestamped) {
  @attr('string') name;
}
"#,
    );
    write(root, "app/mixins/timestamped.js", TIMESTAMPED);
    write(root, "app/mixins/auditable.js", AUDITABLE);
    write(root, "app/mixins/unused.js", UNUSED);
}

#[test]
fn test_scenario_a_transitive_mixins_are_connected() {
    let temp = TempDir::new().unwrap();
    scenario_a(temp.path());

    let report = run(config(temp.path())).unwrap();

    assert_eq!(
        report.graph.model_to_mixins.get("app/models/user.js"),
        Some(&vec!["app/mixins/timestamped.js".to_string()])
    );
    assert_eq!(
        report.graph.connected_mixins,
        vec!["app/mixins/auditable.js", "app/mixins/timestamped.js"]
    );
    assert_eq!(report.graph.unconnected_mixins, vec!["app/mixins/unused.js"]);
    assert_eq!(
        report.mixins,
        ProcessingResult { processed: 2, skipped: 1, errors: 0 }
    );
    assert!(report.diagnostics.contains(&MigrationDiagnostic::skipped(
        "app/mixins/unused.js",
        SkipReason::NotConnected
    )));
    assert!(!report.has_errors());
}

#[test]
fn test_scenario_a_artifacts_on_disk() {
    let temp = TempDir::new().unwrap();
    scenario_a(temp.path());

    run(config(temp.path())).unwrap();

    let schema = read(temp.path(), "app/data/resources/user.schema.js");
    assert!(schema.starts_with("export const UserSchema = {\n"));
    assert!(schema.contains("type: 'user',"));
    assert!(schema.contains("legacy: true,"));
    assert!(schema.contains("traits: ['timestamped'],"));
    assert!(schema.ends_with("export default UserSchema;\n"));

    let timestamped = read(temp.path(), "app/data/traits/timestamped.schema.js");
    assert!(timestamped.contains("name: 'timestamped',"));
    assert!(timestamped.contains("mode: 'legacy',"));
    assert!(timestamped.contains("traits: ['auditable'],"));
    assert!(temp.path().join("app/data/traits/auditable.schema.js").is_file());
    assert!(!temp.path().join("app/data/traits/unused.schema.js").exists());

    // Declarative-only sources get no extension
    assert!(!temp.path().join("app/data/resources/user.ext.js").exists());
}

#[test]
fn test_scenario_b_relative_helper_is_not_a_mixin() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/models/user.js",
        r#"import Model, { attr } from '@ember-data/model';
import { formatName } from './helpers/format';

export default class User extends Model {
  @attr('string') name;

  get label() {
    // unchanged   spacing
    return formatName(this.name);
  }
}
"#,
    );
    write(
        temp.path(),
        "app/models/helpers/format.js",
        "export function formatName(name) {\n  return name;\n}\n",
    );
    write(temp.path(), "app/mixins/unused.js", UNUSED);

    let report = run(config(temp.path())).unwrap();

    assert!(report.graph.model_to_mixins.is_empty());
    assert!(report.graph.connected_mixins.is_empty());
    assert!(report.diagnostics.contains(&MigrationDiagnostic::skipped(
        "app/models/helpers/format.js",
        SkipReason::NoDeclaration
    )));

    let extension = read(temp.path(), "app/data/resources/user.ext.js");
    assert!(extension.contains(
        "get label() {\n    // unchanged   spacing\n    return formatName(this.name);\n  }"
    ));
    assert!(extension.contains("import { formatName } from '../../models/helpers/format';"));
    assert!(!extension.contains("@ember-data/model"));

    let schema = read(temp.path(), "app/data/resources/user.schema.js");
    assert!(schema.contains("objectExtensions: ['UserExtension'],"));
}

#[test]
fn test_scenario_c_directory_mapping_rewrites_parent_import() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/core/widgets/button.js",
        r#"import Model, { attr } from '@ember-data/model';
import { X } from '../shared/util';

export default class Button extends Model {
  @attr('string') caption;

  get decorated() {
    return X(this.caption);
  }
}
"#,
    );
    write(temp.path(), "app/core/shared/util.js", "export const X = (v) => v;\n");

    let mut cfg = config(temp.path());
    cfg.models.directory = Some(PathBuf::from("app/core"));
    cfg.import_mappings = vec![ImportMapping {
        directory: "app/core".to_string(),
        import_base: "my-lib/core".to_string(),
    }];

    run(cfg).unwrap();

    let extension = read(temp.path(), "app/data/resources/button.ext.js");
    assert!(extension.contains("import { X } from 'my-lib/core/widgets/shared/util';"));
}

#[test]
fn test_scenario_c_without_mapping_uses_relative_path() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/core/widgets/button.js",
        r#"import Model from '@ember-data/model';
import { X } from '../shared/util';

export default class Button extends Model {
  get decorated() {
    return X();
  }
}
"#,
    );
    let mut cfg = config(temp.path());
    cfg.models.directory = Some(PathBuf::from("app/core"));

    run(cfg).unwrap();

    let extension = read(temp.path(), "app/data/resources/button.ext.js");
    assert!(extension.contains("import { X } from '../../core/shared/util';"));
}

/// Models and mixins both under `addons/*/addon/...` wildcard mappings
fn addon_config(root: &Path) -> MigrationConfig {
    let mut config = config(root);
    config.models.additional.push(PathMapping {
        pattern: "@addons/*/models".to_string(),
        directory: PathBuf::from("addons/*/addon/models"),
    });
    config.mixins.additional.push(PathMapping {
        pattern: "@addons/*/mixins".to_string(),
        directory: PathBuf::from("addons/*/addon/mixins"),
    });
    config
}

#[test]
fn test_wildcard_addon_roots_classify_and_connect() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/models/user.js",
        r#"import Model, { attr } from '@ember-data/model';
import Logged from '@addons/audit/mixins/logged';

export default class User extends Model.extend(Logged) {
  @attr('string') name;
}
"#,
    );
    write(
        temp.path(),
        "addons/audit/addon/mixins/logged.js",
        r#"import Mixin from '@ember/object/mixin';
import { attr } from '@ember-data/model';

export default Mixin.create({
  loggedAt: attr('date')
});
"#,
    );
    write(
        temp.path(),
        "addons/audit/addon/models/entry.js",
        r#"import Model, { attr } from '@ember-data/model';

export default class Entry extends Model {
  @attr('string') message;
}
"#,
    );
    write(
        temp.path(),
        "addons/audit/addon/utils/fmt.js",
        "export default function fmt(value) {\n  return value;\n}\n",
    );

    let report = run(addon_config(temp.path())).unwrap();

    assert_eq!(
        report.graph.model_to_mixins.get("app/models/user.js"),
        Some(&vec!["addons/audit/addon/mixins/logged.js".to_string()])
    );
    assert_eq!(
        report.graph.connected_mixins,
        vec!["addons/audit/addon/mixins/logged.js"]
    );
    assert_eq!(
        report.models,
        ProcessingResult { processed: 2, skipped: 0, errors: 0 }
    );
    assert_eq!(
        report.mixins,
        ProcessingResult { processed: 1, skipped: 0, errors: 0 }
    );

    // Files beside the configured roots are never discovered
    assert!(report.artifacts.iter().all(|a| !a.source.contains("utils")));
    assert!(report.diagnostics.iter().all(|d| !d.to_string().contains("utils")));

    let logged = read(temp.path(), "app/data/traits/logged.schema.js");
    assert!(logged.contains("name: 'logged',"));
    let user = read(temp.path(), "app/data/resources/user.schema.js");
    assert!(user.contains("traits: ['logged'],"));
    let entry = read(temp.path(), "app/data/resources/entry.schema.js");
    assert!(entry.contains("type: 'entry',"));
    assert!(!temp.path().join("app/data/resources/logged.schema.js").exists());
}

#[test]
fn test_polymorphic_and_type_only_signals_connect_mixins() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/models/comment.js",
        r#"import Model, { belongsTo } from '@ember-data/model';

export default class Comment extends Model {
  @belongsTo('commentable', { polymorphic: true, async: false }) target;
}
"#,
    );
    write(
        temp.path(),
        "app/models/post.ts",
        r#"import Model, { attr } from '@ember-data/model';
import type Taggable from '../mixins/taggable';

export default class Post extends Model {
  @attr('string') declare title: string;
}
"#,
    );
    write(temp.path(), "app/mixins/commentable.js", UNUSED);
    write(
        temp.path(),
        "app/mixins/taggable.ts",
        "import Mixin from '@ember/object/mixin';\nimport { hasMany } from '@ember-data/model';\n\nexport default Mixin.create({\n  tags: hasMany('tag')\n});\n",
    );
    write(temp.path(), "app/mixins/orphan.js", UNUSED);

    let report = run(config(temp.path())).unwrap();

    assert_eq!(
        report.graph.connected_mixins,
        vec!["app/mixins/commentable.js", "app/mixins/taggable.ts"]
    );
    assert_eq!(report.graph.unconnected_mixins, vec!["app/mixins/orphan.js"]);
    // Liveness only: neither mixin is composed into a schema
    let post = read(temp.path(), "app/data/resources/post.schema.ts");
    assert!(!post.contains("traits:"));
    assert!(temp.path().join("app/data/traits/taggable.schema.ts").is_file());
}

#[test]
fn test_excluded_files_are_reported_not_migrated() {
    let temp = TempDir::new().unwrap();
    scenario_a(temp.path());
    write(temp.path(), "app/models/legacy/old.js", "export default class Old {}\n");

    let mut cfg = config(temp.path());
    cfg.exclude = vec!["app/models/legacy/**".to_string()];
    let report = run(cfg).unwrap();

    assert!(report.diagnostics.contains(&MigrationDiagnostic::skipped(
        "app/models/legacy/old.js",
        SkipReason::ExcludedByGlob
    )));
    assert_eq!(report.models.processed, 1);
    assert!(!temp.path().join("app/data/resources/old.schema.js").exists());
}

fn intermediate_fixture(root: &Path) {
    write(
        root,
        "app/models/base-model.js",
        r#"import Model, { attr } from '@ember-data/model';

export default class BaseModel extends Model {
  @attr('date') createdAt;
}
"#,
    );
    write(
        root,
        "app/models/auditable-model.js",
        r#"import { attr } from '@ember-data/model';
import BaseModel from './base-model';

export default class AuditableModel extends BaseModel {
  @attr('date') auditedAt;
}
"#,
    );
    write(
        root,
        "app/models/user.js",
        r#"import { attr } from '@ember-data/model';
import AuditableModel from 'my-app/models/auditable-model';

export default class User extends AuditableModel {
  @attr('string') name;
}
"#,
    );
}

#[test]
fn test_intermediate_models_become_traits_bases_first() {
    let temp = TempDir::new().unwrap();
    intermediate_fixture(temp.path());

    let mut cfg = config(temp.path());
    // Derived model listed first on purpose
    cfg.intermediate_models = vec![
        "my-app/models/auditable-model".to_string(),
        "my-app/models/base-model".to_string(),
    ];
    let report = run(cfg).unwrap();

    assert!(!report.has_errors(), "{:?}", report.diagnostics);
    assert_eq!(report.models.processed, 3);
    let order: Vec<&str> = report.artifacts.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "app/data/traits/base-model.schema.js",
            "app/data/traits/auditable-model.schema.js",
            "app/data/resources/user.schema.js",
        ]
    );

    let auditable = read(temp.path(), "app/data/traits/auditable-model.schema.js");
    assert!(auditable.contains("traits: ['base-model'],"));
    let user = read(temp.path(), "app/data/resources/user.schema.js");
    assert!(user.contains("traits: ['auditable-model'],"));
    assert!(!temp.path().join("app/data/resources/base-model.schema.js").exists());
}

#[test]
fn test_intermediate_cycle_is_reported_and_broken() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/models/a.js",
        "import B from './b';\nexport default class A extends B {}\n",
    );
    write(
        temp.path(),
        "app/models/b.js",
        "import A from './a';\nexport default class B extends A {}\n",
    );

    let mut cfg = config(temp.path());
    cfg.intermediate_models = vec!["my-app/models/a".to_string(), "my-app/models/b".to_string()];
    let report = run(cfg).unwrap();

    assert!(report
        .errors()
        .any(|d| d.format_stderr().contains("MIG-CFG-002")));
    assert_eq!(report.models.processed, 2);
}

#[test]
fn test_typescript_sources_get_type_artifacts() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "app/models/user.ts",
        r#"import Model, { attr } from '@ember-data/model';
import Timestamped from '../mixins/timestamped';

export default class User extends Model.extend(Timestamped) {
  @attr('string') declare name: string;

  get label(): string {
    return this.name;
  }
}
"#,
    );
    write(
        temp.path(),
        "app/mixins/timestamped.ts",
        "import Mixin from '@ember/object/mixin';\nimport { attr } from '@ember-data/model';\n\nexport default Mixin.create({\n  createdAt: attr('date'),\n});\n",
    );

    let report = run(config(temp.path())).unwrap();
    assert!(!report.has_errors(), "{:?}", report.diagnostics);

    let types = read(temp.path(), "app/data/resources/user.schema.types.ts");
    assert!(types.contains(
        "import type { TimestampedTrait } from '../traits/timestamped.schema.types';"
    ));
    assert!(types.contains("import type { UserExtensionSignature } from './user.ext.types';"));
    assert!(types.contains("export interface User extends TimestampedTrait, UserExtensionSignature {"));
    assert!(types.contains("  name: string | null;"));

    let ext_types = read(temp.path(), "app/data/resources/user.ext.types.ts");
    assert!(ext_types.contains("import type { UserExtension } from './user.ext';"));
    assert!(ext_types.contains("export type UserExtensionSignature = UserExtension;"));

    let trait_types = read(temp.path(), "app/data/traits/timestamped.schema.types.ts");
    assert!(trait_types.contains("export interface TimestampedTrait {"));
    assert!(trait_types.contains("  createdAt: Date | null;"));
}

#[test]
fn test_write_failure_is_recorded_per_file() {
    let temp = TempDir::new().unwrap();
    scenario_a(temp.path());
    // A regular file where the resources directory should be
    write(temp.path(), "blocked", "");

    let mut cfg = config(temp.path());
    cfg.output.resources_dir = Some(PathBuf::from("blocked"));
    let report = run(cfg).unwrap();

    assert_eq!(report.models.errors, 1);
    assert!(report
        .errors()
        .any(|d| d.path() == "app/models/user.js" && d.format_stderr().contains("MIG-IO-001")));
    // Other files still migrate
    assert_eq!(report.mixins.processed, 2);
    assert!(temp.path().join("app/data/traits/timestamped.schema.js").is_file());
}
