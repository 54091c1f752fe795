use alloy_sol_types::sol;

sol! {
    interface ENSRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface ENSResolver {
        function supportsInterface(bytes4 interfaceID) external view returns (bool);
        function addr(bytes32 node) external view returns (address);
        function name(bytes32 node) external view returns (string);
    }
}

/// ERC-165 interface id of `addr(bytes32)`.
pub const ADDR_INTERFACE_ID: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];
