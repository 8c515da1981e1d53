use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::assertion::{assert_equal, assert_exists, assert_path, assert_text, equal};
use crate::config::Settings;
use crate::error::{PilotError, Result};
use crate::http::{Method, Transport};
use crate::runner::plan::TestPlan;
use crate::runner::request::RequestSpec;

/// 声明式测试计划文件（TOML）
///
/// ```toml
/// name = "users"
///
/// [[steps]]
/// method = "POST"
/// url = "/users"
/// json = { name = "Max" }
/// store = "user"
///
/// [steps.expect]
/// status = 201
///
/// [[steps]]
/// method = "GET"
/// url = "/users/{user.id}"
///
/// [steps.expect.paths]
/// name = "Max"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDef {
    pub method: Method,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub json: Option<Value>,
    pub form: Option<BTreeMap<String, String>>,
    pub text: Option<String>,
    pub store: Option<String>,
    pub expect: Option<ExpectDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectDef {
    pub status: Option<u16>,
    /// 响应体与之相等（对象和数组按结构比较）
    pub body: Option<Value>,
    /// 响应文本（去除首尾空白）与之相等
    pub text: Option<String>,
    /// 路径 → 期望的 JSON 值
    #[serde(default)]
    pub paths: BTreeMap<String, Value>,
    /// 必须存在的路径（值可以是任意 JSON，包括 null）
    #[serde(default)]
    pub exists: Vec<String>,
    /// 响应头的精确值
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl PlanFile {
    const DEFAULT_NAME: &'static str = "plan";

    /// 读取计划文件；未指定 name 时使用文件名
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut plan = Self::parse(&content).map_err(|e| match e {
            PilotError::Config(msg) => PilotError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        if plan.name.is_none() {
            plan.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(plan)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let plan: PlanFile =
            toml::from_str(content).map_err(|e| PilotError::Config(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::DEFAULT_NAME)
    }

    fn validate(&self) -> Result<()> {
        for (index, step) in self.steps.iter().enumerate() {
            let bodies = [step.json.is_some(), step.form.is_some(), step.text.is_some()]
                .into_iter()
                .filter(|set| *set)
                .count();
            if bodies > 1 {
                return Err(PilotError::Config(format!(
                    "step {}: only one of json, form, text may be set",
                    index + 1
                )));
            }
            let both = step
                .expect
                .as_ref()
                .is_some_and(|e| e.body.is_some() && e.text.is_some());
            if both {
                return Err(PilotError::Config(format!(
                    "step {}: expect.body and expect.text are mutually exclusive",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// 把每个步骤转换为请求
    pub fn specs(&self) -> Result<Vec<RequestSpec>> {
        self.steps.iter().map(StepDef::to_spec).collect()
    }

    /// 构建可执行的测试计划
    pub fn into_plan<T: Transport>(self, transport: T, settings: Settings) -> Result<TestPlan<T>> {
        // 先构建全部请求，失败时不会留下未执行的计划
        let specs = self.specs()?;
        let mut plan = TestPlan::with_transport(self.name(), transport).with_settings(settings);
        for spec in specs {
            plan.push(spec);
        }
        Ok(plan)
    }
}

impl StepDef {
    fn to_spec(&self) -> Result<RequestSpec> {
        let mut spec = RequestSpec::new(self.method, self.url.clone());
        spec.headers(self.headers.clone());

        if let Some(json) = &self.json {
            spec.json(json);
        } else if let Some(form) = &self.form {
            spec.form(form);
        } else if let Some(text) = &self.text {
            spec.text(text.clone());
        }
        if let Some(key) = &self.store {
            spec.store(key.clone());
        }

        if let Some(def) = &self.expect {
            let expect = spec.expect();
            if let Some(status) = def.status {
                expect.status(status);
            }
            if let Some(body) = &def.body {
                expect.body(assert_equal(body.clone()));
            }
            if let Some(text) = &def.text {
                expect.body(assert_text(text.clone()));
            }
            for (path, value) in &def.paths {
                expect.body(assert_path::<Value, _>(path, equal(value.clone())));
            }
            for path in &def.exists {
                expect.body(assert_exists(path));
            }
            for (name, value) in &def.headers {
                expect.header(name.clone(), equal(value.clone()));
            }
        }

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
name = "users"

[[steps]]
method = "post"
url = "/users"
json = { name = "Max" }
store = "user"

[steps.expect]
status = 201
exists = ["id"]

[[steps]]
method = "GET"
url = "/users/{user.id}"
headers = { Accept = "application/json" }

[steps.expect]
status = 200
body = { id = 1, name = "Max" }

[steps.expect.paths]
name = "Max"
"#;

    #[test]
    fn test_parse_plan() {
        let plan = PlanFile::parse(PLAN).unwrap();
        assert_eq!(plan.name(), "users");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].method, Method::Post);
        assert_eq!(plan.steps[0].store.as_deref(), Some("user"));

        let expect = plan.steps[1].expect.as_ref().unwrap();
        assert_eq!(expect.status, Some(200));
        assert_eq!(expect.paths["name"], Value::String("Max".to_string()));
    }

    #[test]
    fn test_specs_from_plan() {
        let specs = PlanFile::parse(PLAN).unwrap().specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].store_key(), Some("user"));
        assert_eq!(specs[1].url(), "/users/{user.id}");
        assert_eq!(specs[1].expectation().unwrap().expected_status(), Some(200));
    }

    #[test]
    fn test_reject_two_bodies() {
        let content = r#"
[[steps]]
method = "POST"
url = "/users"
json = { name = "Max" }
text = "Max"
"#;
        let err = PlanFile::parse(content).unwrap_err();
        assert_eq!(
            err.to_string(),
            "配置错误: step 1: only one of json, form, text may be set"
        );
    }

    #[test]
    fn test_reject_unknown_method_and_fields() {
        let content = r#"
[[steps]]
method = "FETCH"
url = "/users"
"#;
        assert!(PlanFile::parse(content).is_err());

        let content = r#"
[[steps]]
method = "GET"
url = "/users"
retries = 3
"#;
        assert!(PlanFile::parse(content).is_err());
    }

    #[test]
    fn test_name_defaults_to_file_stem() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"[[steps]]\nmethod = \"GET\"\nurl = \"/ping\"\n")
            .unwrap();

        let plan = PlanFile::load(&path).unwrap();
        assert_eq!(plan.name(), "smoke");
    }
}
