// End-to-end presale lifecycle against a local development node.
//
// Mirrors the presale buy/window scenario: deploy the token, deploy the
// presale with a window opening 1000s from now, fund the sale, then
// warp chain time across the opening and closing boundaries.
//
// Needs a dev node on 127.0.0.1:8545 seeded with the standard test
// mnemonic, and compiled artifacts under ./artifacts.

use std::sync::Arc;

use anyhow::Result;
use ethers::abi::Token;
use ethers::middleware::SignerMiddleware;
use ethers::signers::Signer;
use ethers::types::U256;

use presale_deploy::config::wallet_from_mnemonic;
use presale_deploy::time::current_time;
use presale_deploy::units::{to_bn_scaled, to_wei, DEFAULT_DECIMALS};
use presale_deploy::{ArtifactStore, ChainTime, DeployContext, MemoryAddressBook, Network};

const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

#[tokio::test]
#[ignore = "requires a local development node and compiled artifacts"]
async fn presale_window_opens_and_closes() -> Result<()> {
    let network = Network::hardhat();
    let provider = network.provider()?;
    let wallet = wallet_from_mnemonic(DEV_MNEMONIC, 0, network.chain_id)?;
    let owner_addr = wallet.address();
    let client = Arc::new(SignerMiddleware::new((*provider).clone(), wallet));

    let mut ctx = DeployContext::new(
        client,
        ArtifactStore::new("artifacts"),
        Box::new(MemoryAddressBook::new()),
    );

    // Deploy the token, then the presale referencing it
    let token = ctx.deploy("CatDoge", Vec::new()).await?;

    let rate = U256::from(3_000_000_000u64);
    let opening_time = current_time(1000);
    let closing_time = current_time(10_000);
    let args = vec![
        Token::Uint(rate),
        Token::Address(owner_addr),
        Token::Address(token.address()),
        Token::Uint(U256::from(opening_time)),
        Token::Uint(U256::from(closing_time)),
        Token::Uint(to_bn_scaled(10, DEFAULT_DECIMALS)),
        Token::Uint(to_wei(0.01, DEFAULT_DECIMALS)?),
    ];
    let presale = ctx.deploy("PreSale", args).await?;

    // Fund the sale with half the supply (token decimals are 3)
    let to_transfer = to_bn_scaled(10u64.pow(15) / 2, 3);
    token
        .method::<_, bool>("transfer", (presale.address(), to_transfer))?
        .send()
        .await?
        .await?;

    let chain_time = ChainTime::new(provider, &network);

    // Before the opening offset the sale is not yet open
    let open: bool = presale.method("isOpen", ())?.call().await?;
    assert!(!open);

    // 2000s past the 1000s opening offset: open, not yet closed
    chain_time.advance_time_and_block(2000).await?;
    let open: bool = presale.method("isOpen", ())?.call().await?;
    assert!(open);
    let closed: bool = presale.method("hasClosed", ())?.call().await?;
    assert!(!closed);

    // 10000s more crosses the closing offset
    chain_time.advance_time_and_block(10_000).await?;
    let closed: bool = presale.method("hasClosed", ())?.call().await?;
    assert!(closed);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a local development node and compiled artifacts"]
async fn presale_delivers_tokens_at_the_configured_rate() -> Result<()> {
    let network = Network::hardhat();
    let provider = network.provider()?;
    let owner = wallet_from_mnemonic(DEV_MNEMONIC, 0, network.chain_id)?;
    let buyer = wallet_from_mnemonic(DEV_MNEMONIC, 1, network.chain_id)?;
    let owner_addr = owner.address();
    let client = Arc::new(SignerMiddleware::new((*provider).clone(), owner));

    let mut ctx = DeployContext::new(
        client,
        ArtifactStore::new("artifacts"),
        Box::new(MemoryAddressBook::new()),
    );

    let token = ctx.deploy("CatDoge", Vec::new()).await?;

    let rate = 3u64 * 10u64.pow(9);
    let args = vec![
        Token::Uint(U256::from(rate)),
        Token::Address(owner_addr),
        Token::Address(token.address()),
        Token::Uint(U256::from(current_time(1000))),
        Token::Uint(U256::from(current_time(100_000))),
        Token::Uint(to_bn_scaled(10, DEFAULT_DECIMALS)),
        Token::Uint(to_wei(0.01, DEFAULT_DECIMALS)?),
    ];
    let presale = ctx.deploy("PreSale", args).await?;

    token
        .method::<_, bool>("transfer", (presale.address(), to_bn_scaled(10u64.pow(15) / 2, 3)))?
        .send()
        .await?
        .await?;

    ChainTime::new(provider.clone(), &network)
        .advance_time_and_block(2000)
        .await?;

    // Buy 0.1 BNB worth from the second account
    let buyer_client = Arc::new(SignerMiddleware::new((*provider).clone(), buyer.clone()));
    let buyer_ctx = DeployContext::new(
        buyer_client,
        ArtifactStore::new("artifacts"),
        Box::new(MemoryAddressBook::new()),
    );
    buyer_ctx
        .attach("PreSale", Some(presale.address()))?
        .method::<_, ()>("buyTokens", ())?
        .value(to_wei(0.1, DEFAULT_DECIMALS)?)
        .send()
        .await?
        .await?;

    // 0.1 BNB * rate tokens, delivered at the token's 3 decimals
    let balance: U256 = token.method("balanceOf", buyer.address())?.call().await?;
    let expected = to_bn_scaled(rate / 10, 3);
    assert_eq!(balance, expected);

    Ok(())
}
