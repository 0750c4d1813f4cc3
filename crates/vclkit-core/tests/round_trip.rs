// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parse and print a realistic service configuration end to end.

use vclkit_core::ast::{ExpressionKind, Program, StatementKind};
use vclkit_core::parse_source;
use vclkit_core::unparse::{FormatOptions, unparse_program, unparse_program_with};

const SERVICE: &str = r##"# Edge configuration for the storefront.
import boltsort;
include "shared_macros";

acl internal {
  "192.0.2.0"/24;
  !"192.0.2.7";
  "2001:db8::1";
}

backend origin {
  .host = "origin.example.com";
  .port = "443";
  .ssl = true;
  .probe = {
    .url = "/healthz";
    .interval = 15s;
    .timeout = 2s;
  }
}

table redirects STRING {
  "/old": "/new",
  "/legacy/home": "/",
}

sub vcl_recv {
  # normalise the query string first
  set req.url = boltsort.sort(req.url);
  declare local var.country STRING;
  set var.country = table.lookup(redirects, client.geo.country_code, "none");

  if (req.http.Fastly-Debug && client.ip ~ internal) {
    set req.http.X-Debug = "on"; # expose timings
  } else if (req.url ~ "^/admin" || req.url ~ "^/internal") {
    error 403 "Forbidden";
  } else if (!req.http.Cookie:session) {
    unset req.http.Cookie;
  } else {
    set req.http.X-Forwarded-Host = req.http.Host;
  }

  if (req.restarts == 0) {
    set req.http.X-Request-Id = randomstr(16, "0123456789abcdef") "-" now.sec;
  }

  call vcl_recv_custom;
  return(lookup);
}

sub vcl_error {
  if (obj.status == 903) {
    set obj.status = 301;
    set obj.http.Location = "https://" req.http.Host req.url;
    synthetic {"<html>
  <body>Moved</body>
</html>"};
    return(deliver);
  }
}

sub vcl_deliver {
  set resp.http.X-Served-By = server.identity;
  log "syslog " req.service_id " cdn :: " req.url;
}
"##;

#[track_caller]
fn parse_stripped(source: &str) -> Program {
    let mut program = parse_source(source).unwrap_or_else(|err| panic!("{err}\n{source}"));
    program.strip_locations();
    program
}

#[test]
fn service_prints_unchanged() {
    let program = parse_source(SERVICE).expect("service parses");
    assert_eq!(unparse_program(&program), SERVICE);
}

#[test]
fn service_tree_survives_printing() {
    let printed = unparse_program(&parse_source(SERVICE).expect("service parses"));
    assert_eq!(parse_stripped(&printed), parse_stripped(SERVICE));
}

#[test]
fn compact_source_is_normalised() {
    let compact = "sub vcl_recv{if(req.url~\"^/a\"){set req.http.X=\"a\"+\"b\";}elsif(a){esi;}else{return(pass);}}";
    let expected = "sub vcl_recv {\n  if (req.url ~ \"^/a\") {\n    set req.http.X = \"a\" \"b\";\n  } else if (a) {\n    esi;\n  } else {\n    return(pass);\n  }\n}\n";
    let printed = unparse_program(&parse_source(compact).expect("compact parses"));
    assert_eq!(printed, expected);
    assert_eq!(parse_stripped(&printed), parse_stripped(compact));
}

#[test]
fn narrow_width_keeps_the_tree() {
    let program = parse_source(SERVICE).expect("service parses");
    for line_width in [10, 30, 50] {
        let options = FormatOptions {
            line_width,
            ..FormatOptions::default()
        };
        let printed = unparse_program_with(&program, &options);
        assert_eq!(parse_stripped(&printed), parse_stripped(SERVICE), "width {line_width}");
        let reprinted =
            unparse_program_with(&parse_source(&printed).expect("reparses"), &options);
        assert_eq!(reprinted, printed, "width {line_width}");
    }
}

#[test]
fn concatenation_plus_and_juxtaposition_agree() {
    let with_plus = parse_stripped("set req.http.X = \"a\" + req.url + \"b\";");
    let juxtaposed = parse_stripped("set req.http.X = \"a\" req.url \"b\";");
    assert_eq!(with_plus, juxtaposed);
    let StatementKind::Set { value, .. } = &with_plus.body[0].kind else {
        panic!("expected set");
    };
    let ExpressionKind::Concat { body } = &value.kind else {
        panic!("expected concat, got {value:?}");
    };
    assert_eq!(body.len(), 3);
}

#[test]
fn blank_lines_between_subroutines_are_kept() {
    let source = "sub a {}\n\n\n\nsub b {}\n";
    assert_eq!(unparse_program(&parse_source(source).expect("parses")), source);
}

#[test]
fn long_else_if_chain_round_trips() {
    let mut source =
        String::from("sub vcl_recv {\n  if (req.http.Host == \"h0\") {\n    esi;\n  }");
    for n in 1..300 {
        source.push_str(&format!(" else if (req.http.Host == \"h{n}\") {{\n    esi;\n  }}"));
    }
    source.push_str(" else {\n    restart;\n  }\n}\n");

    let printed = unparse_program(&parse_source(&source).expect("long chain parses"));
    assert_eq!(printed, source);
    assert_eq!(parse_stripped(&printed), parse_stripped(&source));
}
