#![allow(non_snake_case)]

/*!
# 📖 Strata Playbook

Strata is a library of composable byte channels written in Rust. A channel is a readable, writable,
and closable byte stream. Leaf channels talk to a backend (memory, files, sockets), decorators wrap a
single inner channel and add one capability: buffering, text encoding, or compression. Blocking
chains can be driven from async code through an adapter.

This documentation provides in-depth explanation of available features. We suggest to begin from
the [Quickstart](crate::docs::a1__quickstart) and then move to other sections.

## Contents

1. Basics
    1. [Quickstart](crate::docs::a1__quickstart)
    1. [Layering](crate::docs::a2__layering)
    1. [Asynchronous API](crate::docs::a3__async_api)
1. Contributing
    1. [Testing](crate::docs::e1__testing)

<em>[Quickstart →](crate::docs::a1__quickstart)</em>
*/

pub mod a1__quickstart;
pub mod a2__layering;
#[cfg(feature = "async")]
pub mod a3__async_api;
pub mod e1__testing;
