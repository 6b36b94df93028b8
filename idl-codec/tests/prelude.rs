//! The facade prelude is enough to drive a full encode/decode cycle.

use idl_codec::prelude::*;

const IDL: &str = r#"{
    "version": "0.1.0",
    "name": "vault",
    "instructions": [
        {
            "name": "deposit",
            "accounts": [{ "name": "vault", "isMut": true, "isSigner": false }],
            "args": [{ "name": "lamports", "type": "u64" }]
        }
    ],
    "accounts": [
        {
            "name": "Vault",
            "type": {
                "kind": "struct",
                "fields": [
                    { "name": "owner", "type": "publicKey" },
                    { "name": "balance", "type": "u64" }
                ]
            }
        }
    ]
}"#;

#[derive(BorshSerialize, BorshDeserialize, Debug, PartialEq)]
struct Vault {
    owner: Pubkey,
    balance: u64,
}

#[test]
fn test_prelude_round_trip() {
    let coder = IdlCoder::new(&Idl::from_json(IDL).unwrap()).unwrap();

    let data = coder
        .instructions()
        .encode("deposit", &Fields::new().with("lamports", 500u64))
        .unwrap();
    let decoded = coder.instructions().decode_any(&data).unwrap().unwrap();
    assert_eq!(decoded.to_string(), "deposit { lamports: 500 }");

    let vault = Vault {
        owner: Pubkey([3; 32]),
        balance: 10,
    };
    let mut account = coder.accounts().discriminator("Vault").unwrap().0.to_vec();
    account.extend(borsh::to_vec(&vault).unwrap());
    let typed: Vault = coder.accounts().decode_typed("Vault", &account).unwrap();
    assert_eq!(typed, vault);

    let value = coder.accounts().decode("Vault", &account).unwrap();
    assert_eq!(
        to_json(&value),
        serde_json::json!({ "owner": Pubkey([3; 32]).to_string(), "balance": 10 })
    );
}

#[test]
fn test_error_kind_is_reexported() {
    let coder = IdlCoder::new(&Idl::from_json(IDL).unwrap()).unwrap();
    let err = coder.accounts().decode("Vault", &[0; 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
}
