// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::path::{Path, PathBuf};

use assert_cmd::Command;

// Anvil's first pre-funded account
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const BASE_CONFIG: &str = r#"
CONSUMER_ADDRESS = "0x8dFf78B7EE3128D00E90611FBeD20A71397064D9"
SUBSCRIPTION_ID = 1234
ROUTER_ADDRESS = "0x6E2dc0F9DB014aE19888F539E59285D2Ea04244C"
LINK_TOKEN_ADDRESS = "0x326C977E6efc84E512bB9C30f76E30c160eD06FB"
DONID = "fun-polygon-mumbai-1"
EXPLORER_URL = "https://mumbai.polygonscan.com"
SOURCEFILE = "sources/request.js"
ARGS = ["US"]
GAS_LIMIT = 300000
RETURN_TYPE = "uint256"
"#;

/// Write a request config and its source into `dir`.
pub fn write_config(dir: &Path, extra: &str) -> PathBuf {
    std::fs::create_dir_all(dir.join("sources")).unwrap();
    std::fs::write(dir.join("sources/request.js"), "return Functions.encodeUint256(1)").unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, format!("{BASE_CONFIG}\n{extra}")).unwrap();
    path
}

/// The `functions` binary, isolated from the caller's environment and run inside `dir`.
pub fn functions_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("functions").unwrap();
    cmd.current_dir(dir)
        .env_remove("DEVELOPER_ACCOUNT_PK")
        .env_remove("POLYGON_MUMBAI_RPC_URL")
        .env_remove("COINMARKETCAP_API_KEY")
        .env_remove("FUNCTIONS_TOOLKIT_URL")
        .env_remove("FUNCTIONS_CONFIG")
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "functions_client=debug,info");
    cmd
}
