mod common;

use num_bigint::BigUint;

use casper_client::abi;
use casper_client::error::ClientError;
use casper_client::state::{
	resolve_balance, Account, BigInt, Key, KeyHash, KeyVariant, NamedKey, StateValue, URef,
};
use casper_client::{CasperApi, CasperClient};

use common::CannedNode;

const ADDRESS: &str = "0101010101010101010101010101010101010101010101010101010101010101";
const BLOCK: &str = "ffee";

fn uref(byte: u8) -> URef {
	URef {
		uref: vec![byte; 32],
		access_rights: None,
	}
}

fn account(known_urefs: Vec<NamedKey>) -> StateValue {
	StateValue::Account(Account {
		public_key: vec![1; 32],
		purse_id: uref(0x22),
		known_urefs,
	})
}

fn mint_key() -> NamedKey {
	NamedKey {
		name: "mint".into(),
		key: Key::Uref(uref(0x33)),
	}
}

fn canned_chain(balance: &str) -> Vec<StateValue> {
	vec![
		account(vec![
			NamedKey {
				name: "pos".into(),
				key: Key::Uref(uref(0x99)),
			},
			mint_key(),
		]),
		StateValue::Key(Key::Uref(uref(0x44))),
		StateValue::Key(Key::Uref(uref(0x55))),
		StateValue::BigInt(BigInt {
			value: balance.into(),
			bit_width: 512,
		}),
	]
}

#[tokio::test]
async fn resolves_balance_through_the_mint() {
	let node = CannedNode::with_states(canned_chain("123456"));
	let balance = resolve_balance(&node, ADDRESS, BLOCK).await.unwrap();
	assert_eq!(balance, BigUint::from(123456u32));

	let queries = node.queries();
	assert_eq!(queries.len(), 4);

	assert_eq!(queries[0].key_variant, KeyVariant::Address);
	assert_eq!(queries[0].key_base16, ADDRESS);

	assert_eq!(queries[1].key_variant, KeyVariant::Uref);
	assert_eq!(queries[1].key_base16, hex::encode([0x33; 32]));

	let purse = hex::encode(abi::byte_array(&[0x22; 32]));
	assert_eq!(queries[2].key_variant, KeyVariant::Local);
	assert_eq!(queries[2].key_base16, format!("{}:{purse}", hex::encode([0x44; 32])));
	assert!(purse.starts_with("20000000"));

	assert_eq!(queries[3].key_variant, KeyVariant::Uref);
	assert_eq!(queries[3].key_base16, hex::encode([0x55; 32]));
}

#[tokio::test]
async fn client_balance_uses_the_same_chain() {
	let client = CasperClient::new(CannedNode::with_states(canned_chain("1000000000000000000000000")));
	let balance = client.balance(ADDRESS, BLOCK).await.unwrap();
	assert_eq!(balance, "1000000000000000000000000".parse::<BigUint>().unwrap());
}

#[tokio::test]
async fn missing_mint_reference() {
	let node = CannedNode::with_states(vec![account(vec![])]);
	let err = resolve_balance(&node, ADDRESS, BLOCK).await.unwrap_err();
	assert!(matches!(err, ClientError::MissingMintReference));
	assert_eq!(node.queries().len(), 1);
}

#[tokio::test]
async fn non_account_record_is_unexpected() {
	let node = CannedNode::with_states(vec![StateValue::StringValue("nope".into())]);
	let err = resolve_balance(&node, ADDRESS, BLOCK).await.unwrap_err();
	match err {
		ClientError::UnexpectedStateShape { expected, observed } => {
			assert_eq!(expected, "account");
			assert_eq!(observed, "string_value");
		}
		other => panic!("unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn mint_private_must_be_a_uref() {
	let node = CannedNode::with_states(vec![
		account(vec![mint_key()]),
		StateValue::Key(Key::Hash(KeyHash { hash: vec![0; 32] })),
	]);
	let err = resolve_balance(&node, ADDRESS, BLOCK).await.unwrap_err();
	assert!(matches!(
		err,
		ClientError::UnexpectedStateShape { expected: "uref key", .. }
	));
}

#[tokio::test]
async fn balance_record_must_be_big_int() {
	let mut chain = canned_chain("0");
	chain[3] = StateValue::LongValue(5);
	let node = CannedNode::with_states(chain);
	let err = resolve_balance(&node, ADDRESS, BLOCK).await.unwrap_err();
	assert!(matches!(
		err,
		ClientError::UnexpectedStateShape { expected: "big_int", .. }
	));
}

#[tokio::test]
async fn bad_address_fails_before_any_query() {
	let node = CannedNode::with_states(canned_chain("1"));
	let err = resolve_balance(&node, "not-hex", BLOCK).await.unwrap_err();
	assert!(matches!(err, ClientError::InvalidArgument(_)));
	assert!(node.queries().is_empty());
}
