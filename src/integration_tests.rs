/// # Integration Tests Module
///
/// End-to-end flows over the scripted mock driver: connect, execute,
/// iterate, and release, crossing every module boundary the embedding
/// host would cross. Per-operation behavior is covered next to each
/// module; these tests pin down how the pieces compose.

#[cfg(test)]
mod tests {
    use crate::driver::mock::MockDriver;
    use crate::{connect, version_info, MyconnError, QueryOutcome};

    const USERS_QUERY: &str = "SELECT id, name, email FROM users";

    fn users_driver() -> MockDriver {
        MockDriver::new().with_result(
            USERS_QUERY,
            &["id", "name", "email"],
            vec![
                vec![Some("1"), Some("alice"), Some("alice@example.com")],
                vec![Some("2"), Some("bob"), None],
                vec![Some("3"), Some(""), Some("carol@example.com")],
            ],
        )
    }

    #[test]
    fn test_connect_query_iterate_release() {
        let driver = users_driver();
        let mut conn = connect(&driver, Some("db.example.com:3307"), Some("app"), Some("pw"))
            .unwrap();

        let mut result = conn
            .query(USERS_QUERY)
            .unwrap()
            .into_rows()
            .expect("SELECT should produce a result set");

        let mut names = Vec::new();
        while result.advance().unwrap() {
            names.push(
                result
                    .column_by_name("name")
                    .unwrap()
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            );
        }
        assert_eq!(
            names,
            vec![
                Some("alice".to_string()),
                Some("bob".to_string()),
                Some("".to_string()),
            ]
        );

        assert!(result.close());
        assert!(conn.close());
    }

    #[test]
    fn test_advance_count_matches_buffered_size() {
        let driver = users_driver();
        let mut conn = connect(&driver, None, None, None).unwrap();
        let mut result = conn.query(USERS_QUERY).unwrap().into_rows().unwrap();

        let mut advanced = 0u64;
        while result.advance().unwrap() {
            advanced += 1;
        }
        assert_eq!(advanced, result.size().unwrap());
    }

    #[test]
    fn test_named_and_positional_access_agree_on_every_cell() {
        let driver = users_driver();
        let mut conn = connect(&driver, None, None, None).unwrap();
        let mut result = conn.query(USERS_QUERY).unwrap().into_rows().unwrap();

        let fields = result.field_names().unwrap().clone();
        while result.advance().unwrap() {
            for (name, index) in &fields {
                let by_name = result.column_by_name(name).unwrap().map(<[u8]>::to_vec);
                let by_position = result.column(index - 1).unwrap().map(<[u8]>::to_vec);
                assert_eq!(by_name, by_position, "column {name} disagrees");
            }
        }
    }

    #[test]
    fn test_streamed_result_iterates_one_row_at_a_time() {
        let driver = users_driver();
        let mut conn = connect(&driver, None, None, None).unwrap();
        let mut result = conn
            .unbuffered_query(USERS_QUERY)
            .unwrap()
            .into_rows()
            .unwrap();

        assert!(result.advance().unwrap());
        assert_eq!(result.column(0).unwrap(), Some(&b"1"[..]));

        // size/seek on a streamed result are driver-defined; the pinned
        // property is only that neither crashes.
        let _ = result.size().unwrap();
        result.seek(0).unwrap();

        while result.advance().unwrap() {}
        assert!(result.row().unwrap().is_none());
    }

    #[test]
    fn test_dml_yields_affected_count_not_result_set() {
        let driver = users_driver()
            .with_affected("INSERT INTO users (name) VALUES ('dave')", 1, 4)
            .with_affected("UPDATE users SET name='x'", 3, 0);
        let mut conn = connect(&driver, None, None, None).unwrap();

        let outcome = conn
            .query("INSERT INTO users (name) VALUES ('dave')")
            .unwrap();
        assert!(matches!(outcome, QueryOutcome::Affected(1)));
        assert_eq!(conn.insert_id().unwrap(), 4);

        let outcome = conn.query("UPDATE users SET name='x'").unwrap();
        assert_eq!(outcome.affected(), Some(3));
    }

    #[test]
    fn test_result_outlives_connection_close() {
        let driver = users_driver();
        let mut conn = connect(&driver, None, None, None).unwrap();
        let mut result = conn.query(USERS_QUERY).unwrap().into_rows().unwrap();

        // The handles are released independently; dropping the
        // connection first must not invalidate the result handle's own
        // lifecycle bookkeeping.
        conn.close();
        assert!(result.advance().unwrap());
        assert!(result.close());
    }

    #[test]
    fn test_escaped_payload_embeds_into_statement() {
        let payload = "O'Brien \"quoted\" \\ path";
        let driver = users_driver();
        let conn = connect(&driver, None, None, None).unwrap();
        let escaped = conn.escape_string(payload).unwrap();
        let statement = format!("INSERT INTO users (name) VALUES ('{escaped}')");

        // The embedded literal contains no unescaped quote that would
        // terminate it early.
        let literal = statement
            .strip_prefix("INSERT INTO users (name) VALUES ('")
            .unwrap()
            .strip_suffix("')")
            .unwrap();
        let mut chars = literal.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                chars.next();
                continue;
            }
            assert_ne!(c, '\'', "unescaped quote in {literal:?}");
        }
    }

    #[test]
    fn test_closed_handles_fail_with_argument_errors_end_to_end() {
        let driver = users_driver();
        let mut conn = connect(&driver, None, None, None).unwrap();
        let mut result = conn.query(USERS_QUERY).unwrap().into_rows().unwrap();

        assert!(conn.close());
        assert!(!conn.close());
        assert!(result.close());
        assert!(!result.close());

        assert!(matches!(
            conn.query("SELECT 1"),
            Err(MyconnError::Argument(_))
        ));
        assert!(matches!(result.advance(), Err(MyconnError::Argument(_))));
    }

    #[test]
    fn test_version_report_lists_client_and_protocol() {
        let driver = users_driver();
        let report = version_info(&driver);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CLIENT_VERSION"));
        assert!(lines[1].starts_with("PROTOCOL_VERSION"));
    }
}
