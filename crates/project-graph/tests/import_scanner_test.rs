use orbit_project_graph::{DependencyType, ScannedImport, is_scannable_file, scan_imports};

fn specifiers(contents: &str) -> Vec<(String, DependencyType)> {
    scan_imports(contents)
        .into_iter()
        .map(|ScannedImport { specifier, type_of }| (specifier, type_of))
        .collect()
}

fn stat(specifier: &str) -> (String, DependencyType) {
    (specifier.to_owned(), DependencyType::Static)
}

fn dynamic(specifier: &str) -> (String, DependencyType) {
    (specifier.to_owned(), DependencyType::Dynamic)
}

mod import_scanner {
    use super::*;

    #[test]
    fn only_scans_script_files() {
        assert!(is_scannable_file("libs/a/src/index.ts"));
        assert!(is_scannable_file("libs/a/src/button.tsx"));
        assert!(is_scannable_file("tools/script.mjs"));
        assert!(!is_scannable_file("libs/a/README.md"));
        assert!(!is_scannable_file("libs/a/project.json"));
        assert!(!is_scannable_file("libs/a/.eslintrc"));
    }

    mod statements {
        use super::*;

        #[test]
        fn named_and_default_imports() {
            assert_eq!(
                specifiers(
                    r#"
import { a, b } from '@scope/lib';
import Default from "default-lib";
import * as all from './all';
import type { Type } from 'types-lib';
"#
                ),
                vec![
                    stat("@scope/lib"),
                    stat("default-lib"),
                    stat("./all"),
                    stat("types-lib"),
                ]
            );
        }

        #[test]
        fn side_effect_imports() {
            assert_eq!(
                specifiers("import '@scope/polyfills';\nimport \"zone.js\""),
                vec![stat("@scope/polyfills"), stat("zone.js")]
            );
        }

        #[test]
        fn multiline_imports() {
            assert_eq!(
                specifiers(
                    r#"
import {
  first,
  second,
} from '@scope/multi';
"#
                ),
                vec![stat("@scope/multi")]
            );
        }

        #[test]
        fn re_exports() {
            assert_eq!(
                specifiers(
                    r#"
export { a } from './a';
export * from './b';
export * as c from './c';
export const value = 'not-a-module';
export default 'also-not';
"#
                ),
                vec![stat("./a"), stat("./b"), stat("./c")]
            );
        }

        #[test]
        fn require_calls() {
            assert_eq!(
                specifiers("const a = require('lodash');\nconst { b } = require(\"@scope/b\");"),
                vec![stat("lodash"), stat("@scope/b")]
            );
        }

        #[test]
        fn dynamic_imports() {
            assert_eq!(
                specifiers("const mod = await import('./lazy');"),
                vec![dynamic("./lazy")]
            );
        }

        #[test]
        fn ignores_non_literal_arguments() {
            assert_eq!(
                specifiers(
                    "const a = require(name);\nimport(`./pages/${page}`);\nrequire('a' + b);"
                ),
                vec![]
            );
        }

        #[test]
        fn ignores_member_access() {
            assert_eq!(
                specifiers(
                    "module.require('a');\nconst url = import.meta.url;\nobj.import('b');"
                ),
                vec![]
            );
        }

        #[test]
        fn ignores_keywords_within_strings() {
            assert_eq!(
                specifiers(r#"const s = "import x from 'y'"; const t = 'require("z")';"#),
                vec![]
            );
        }

        #[test]
        fn drops_incomplete_statements() {
            assert_eq!(
                specifiers("import { a };\nconst b = 'not-an-import';"),
                vec![]
            );
        }
    }

    mod comments {
        use super::*;

        #[test]
        fn skips_commented_imports() {
            assert_eq!(
                specifiers(
                    r#"
// import { a } from 'line-comment';
/* const b = require('block-comment'); */
/**
 * import c from 'doc-comment';
 */
import d from 'real';
"#
                ),
                vec![stat("real")]
            );
        }

        #[test]
        fn tolerates_comments_within_statements() {
            assert_eq!(
                specifiers("import { a /* , b */ } from /* where */ 'commented';"),
                vec![stat("commented")]
            );
        }

        #[test]
        fn marker_suppresses_next_statement() {
            assert_eq!(
                specifiers(
                    r#"
// orbit-ignore-next-line
import { a } from 'ignored';
import { b } from 'kept';
// orbit-ignore-next-line
const c = require('ignored-require');
/* orbit-ignore-next-line */
export * from 'ignored-export';
"#
                ),
                vec![stat("kept")]
            );
        }

        #[test]
        fn marker_requires_exact_comment() {
            assert_eq!(
                specifiers("// orbit-ignore-next-line please\nimport 'kept';"),
                vec![stat("kept")]
            );
        }
    }

    mod lazy_contexts {
        use super::*;

        #[test]
        fn load_children_with_import_call() {
            assert_eq!(
                specifiers(
                    r#"
const routes = [
  { path: 'a', loadChildren: () => import('@scope/feature-a').then((m) => m.Module) },
  { path: 'b', loadComponent: () => import('@scope/feature-b').then((m) => m.Page) },
];
"#
                ),
                vec![dynamic("@scope/feature-a"), dynamic("@scope/feature-b")]
            );
        }

        #[test]
        fn load_children_with_require() {
            assert_eq!(
                specifiers(
                    "const routes = [{ loadChildren: () => require('@scope/lazy').Module }];\nconst b = require('@scope/eager');"
                ),
                vec![dynamic("@scope/lazy"), stat("@scope/eager")]
            );
        }

        #[test]
        fn legacy_load_children_string() {
            assert_eq!(
                specifiers("const routes = [{ path: 'a', loadChildren: '@scope/legacy#LegacyModule' }];"),
                vec![dynamic("@scope/legacy")]
            );
        }

        #[test]
        fn lazy_calls() {
            assert_eq!(
                specifiers(
                    r#"
const Page = React.lazy(() => import('./Page'));
const Other = lazy(() => require('@scope/other'));
import { after } from '@scope/after';
"#
                ),
                vec![dynamic("./Page"), dynamic("@scope/other"), stat("@scope/after")]
            );
        }

        #[test]
        fn context_ends_with_property() {
            assert_eq!(
                specifiers(
                    "const route = { loadChildren: () => require('@scope/lazy'), resolve: require('@scope/eager') };"
                ),
                vec![dynamic("@scope/lazy"), stat("@scope/eager")]
            );
        }

        #[test]
        fn property_without_colon_is_not_a_context() {
            assert_eq!(
                specifiers("const { loadChildren } = options;\nconst a = require('@scope/a');"),
                vec![stat("@scope/a")]
            );
        }
    }
}
