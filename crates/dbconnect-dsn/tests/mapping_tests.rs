use dbconnect_dsn::{
   DriverSchema, DsnRequest, Error, FileMapper, NetworkMapper, ParamMapper, PathMapper, match_path,
};
use serde_json::json;

const PRESTO: &str = "presto://<user>@<host>/<catalog>/<schema>";

fn presto() -> DriverSchema {
   DriverSchema::new(PRESTO, &["catalog", "schema"], &[]).unwrap()
}

fn map(mapper: &dyn ParamMapper, schema: &DriverSchema, uri: &str) -> Result<serde_json::Value, Error> {
   let dsn = DsnRequest::parse(uri)?;
   let params = mapper.map(schema, &dsn)?;
   Ok(serde_json::to_value(params.into_present()).unwrap())
}

#[test]
fn test_presto_uri() {
   let params = map(&NetworkMapper, &presto(), "presto://analyst@coordinator:8080/hive/sales").unwrap();

   assert_eq!(
      params,
      json!({
         "catalog": "hive",
         "schema": "sales",
         "host": "coordinator",
         "port": 8080,
         "user": "analyst",
      })
   );
}

#[test]
fn test_port_may_come_from_query_when_absent_from_authority() {
   let params = map(&NetworkMapper, &presto(), "presto://coordinator/hive/sales?port=8443").unwrap();
   assert_eq!(params["port"], "8443");

   let err = map(&NetworkMapper, &presto(), "presto://coordinator:8080/hive/sales?port=8443").unwrap_err();
   assert!(matches!(err, Error::ParameterCollision { ref name, .. } if name == "port"));
}

#[test]
fn test_errors_carry_usage() {
   let err = map(&NetworkMapper, &presto(), "presto://coordinator/hive").unwrap_err();
   assert_eq!(err.error_code(), "MISSING_PARAMETER");
   assert!(err.to_string().ends_with(PRESTO));

   let err = map(&NetworkMapper, &presto(), "presto://coordinator/hive/sales/extra").unwrap_err();
   assert_eq!(err.error_code(), "TOO_MANY_PATH_SEGMENTS");
   assert!(err.to_string().ends_with(PRESTO));
}

#[test]
fn test_unparseable_uri() {
   let err = map(&NetworkMapper, &presto(), "not a uri").unwrap_err();
   assert_eq!(err.error_code(), "INVALID_URI");
}

#[test]
fn test_file_mappers() {
   let duckdb = DriverSchema::new("duckdb://<dbname>@<filepath>", &["database", "dbpath"], &[]).unwrap();
   let params = map(&FileMapper, &duckdb, "duckdb://main@./data/warehouse.duckdb").unwrap();
   assert_eq!(params, json!({"filepath": "./data/warehouse.duckdb", "dbname": "main"}));

   let sqlite = DriverSchema::new("sqlite://<filepath>", &[], &[]).unwrap();
   let params = map(&PathMapper, &sqlite, "sqlite:///tmp/app.db").unwrap();
   assert_eq!(params, json!({"filepath": "/tmp/app.db"}));

   let err = map(&PathMapper, &sqlite, "sqlite:").unwrap_err();
   assert!(matches!(err, Error::MissingParameter { ref name, .. } if name == "filepath"));
}

#[test]
fn test_resolved_names_are_unique_across_sources() {
   let schema = DriverSchema::new("db://<host>/<a>/<b>", &["a", "b?"], &["k"]).unwrap();

   for uri in ["db://h/1?a=2&k=3", "db://h/1/2?b=3&k=4", "db://h/1?k=1&k=2&b=2"] {
      let dsn = DsnRequest::parse(uri).unwrap();
      match match_path(&schema, &dsn) {
         Ok(params) => {
            let names: Vec<&String> = params.iter().map(|(name, _)| name).collect();
            let mut unique = names.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(names.len(), unique.len(), "uri: {uri}");
         }
         Err(err) => assert_eq!(err.error_code(), "PARAMETER_COLLISION", "uri: {uri}"),
      }
   }
}
