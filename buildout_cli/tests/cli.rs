use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("buildout").unwrap()
}

fn json_stdout(args: &[&str]) -> Value {
    let output = cmd().arg("--json").args(args).assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn estimate_reference_project() {
    let output = json_stdout(&["estimate", "--size", "25000", "--floors", "1", "--location", "New York, NY"]);

    assert!((output["uniqueProjectFactor"].as_f64().unwrap() - 1.033).abs() < 1e-9);
    assert!((output["subtotal"].as_f64().unwrap() - 5_991_400.0).abs() < 0.01);
    assert!((output["grandTotal"].as_f64().unwrap() - 6_290_970.0).abs() < 0.01);
    assert_eq!(output["categories"].as_array().unwrap().len(), 6);
    assert_eq!(output["categories"][5]["category"], "Design Fees");
}

#[test]
fn estimate_text_output() {
    cmd()
        .args(["estimate", "--name", "Suite 400", "--size", "25000"])
        .assert()
        .success()
        .stdout(contains("Suite 400"))
        .stdout(contains("FF&E/Appliances"))
        .stdout(contains("$6,290,970"));
}

#[test]
fn ti_allowance_reduces_client_total() {
    let output = json_stdout(&["estimate", "--size", "25000", "--ti-allowance", "50"]);
    assert!((output["tiAllowanceTotal"].as_f64().unwrap() - 1_250_000.0).abs() < 1e-6);
    assert!((output["clientTotal"].as_f64().unwrap() - 5_040_970.0).abs() < 0.01);
}

#[test]
fn sliders_change_the_estimate() {
    let baseline = json_stdout(&["estimate", "--size", "25000"]);
    let premium = json_stdout(&["estimate", "--size", "25000", "--slider", "finish_level=100"]);
    assert!(premium["grandTotal"].as_f64().unwrap() > baseline["grandTotal"].as_f64().unwrap());
}

#[test]
fn high_tier_costs_more() {
    let medium = json_stdout(&["estimate", "--size", "25000"]);
    let high = json_stdout(&["--tier", "high", "estimate", "--size", "25000"]);
    assert!(high["grandTotal"].as_f64().unwrap() > medium["grandTotal"].as_f64().unwrap());
}

#[test]
fn partial_base_override() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.json");
    std::fs::write(&base, r#"{ "signage": 0 }"#).unwrap();

    let output = json_stdout(&["estimate", "--size", "25000", "--base", base.to_str().unwrap()]);
    assert_eq!(output["categories"][2]["totalCost"].as_f64().unwrap(), 0.0);
    assert!(output["categories"][0]["totalCost"].as_f64().unwrap() > 0.0);
}

#[test]
fn zero_size_rejected() {
    cmd()
        .args(["estimate", "--size", "0"])
        .assert()
        .failure()
        .stderr(contains("InvalidInput"));
}

#[test]
fn unknown_slider_rejected() {
    cmd()
        .args(["estimate", "--size", "25000", "--slider", "gold_plating=90"])
        .assert()
        .failure()
        .stderr(contains("gold_plating"));
}

#[test]
fn lists_sliders_and_locations() {
    cmd().arg("sliders").assert().success().stdout(contains("finish_level"));
    cmd().arg("locations").assert().success().stdout(contains("New York, NY"));

    let sliders = json_stdout(&["sliders"]);
    let permitting = sliders
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["id"] == "permitting_complexity")
        .unwrap();
    assert_eq!(permitting["category"], "Design Fees");
}

#[test]
fn save_list_and_compare() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("hq.bce");
    let path = project.to_str().unwrap();

    cmd()
        .args(["save", path, "Baseline", "--size", "25000", "--client", "Acme"])
        .assert()
        .success()
        .stdout(contains("Baseline"));
    cmd()
        .args(["save", path, "Premium", "--size", "25000", "--slider", "finish_level=100"])
        .assert()
        .success();

    let listed = json_stdout(&["list", path]);
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let comparison = json_stdout(&["compare", path, "Baseline", "Premium"]);
    assert_eq!(comparison["leftName"], "Baseline");
    assert!(comparison["categories"][0]["difference"].as_f64().unwrap() > 0.0);
    assert_eq!(comparison["inputDifferences"]["sliders"][0], "finish_level");

    // Lock released after each save
    assert!(!dir.path().join("hq.bce.lock").exists());
}

#[test]
fn save_keeps_the_project_tier() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("hq.bce");
    let path = project.to_str().unwrap();

    cmd().args(["--tier", "high", "save", path, "A", "--size", "25000"]).assert().success();
    cmd().args(["save", path, "B", "--size", "25000"]).assert().success();

    let comparison = json_stdout(&["compare", path, "A", "B"]);
    assert_eq!(comparison["inputDifferences"]["baseValues"], false);
    assert_eq!(comparison["categories"][0]["difference"].as_f64().unwrap(), 0.0);

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&project).unwrap()).unwrap();
    assert_eq!(stored["settings"]["marketTier"], "high");
    let construction_rates: Vec<f64> = stored["estimates"]
        .as_object()
        .unwrap()
        .values()
        .map(|estimate| estimate["baseValues"]["constructionCosts"].as_f64().unwrap())
        .collect();
    assert_eq!(construction_rates, vec![210.0, 210.0]);

    cmd()
        .args(["--tier", "low", "save", path, "C", "--size", "25000"])
        .assert()
        .failure()
        .stderr(contains("InvalidInput"));
    assert_eq!(json_stdout(&["list", path]).as_array().unwrap().len(), 2);
}

#[test]
fn compare_unknown_estimate() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("hq.bce");
    let path = project.to_str().unwrap();
    cmd().args(["save", path, "Only", "--size", "10000"]).assert().success();

    cmd()
        .args(["compare", path, "Only", "Missing"])
        .assert()
        .failure()
        .stderr(contains("Missing"));
}

#[test]
fn share_token_round_trip() {
    let shared = json_stdout(&["share", "--size", "12000", "--floors", "2", "--location", "Boston, MA"]);
    let token = shared["token"].as_str().unwrap().to_string();

    let opened = json_stdout(&["open", &token]);
    assert_eq!(opened["state"]["inputs"]["location"], "Boston, MA");
    assert_eq!(opened["state"]["inputs"]["floors"], 2);

    let direct = json_stdout(&["estimate", "--size", "12000", "--floors", "2", "--location", "Boston, MA"]);
    let a = opened["output"]["grandTotal"].as_f64().unwrap();
    let b = direct["grandTotal"].as_f64().unwrap();
    assert!((a - b).abs() < 1e-6);
}

#[test]
fn open_rejects_garbage() {
    cmd().args(["open", "%%%"]).assert().failure().stderr(contains("InvalidShareToken"));
}

#[test]
fn report_writes_pdf() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("estimate.pdf");

    cmd()
        .args(["report", out.to_str().unwrap(), "--size", "25000", "--prepared-by", "J. Doe"])
        .assert()
        .success()
        .stdout(contains("estimate.pdf"));

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
